//! Offset pagination for the browse pages
//!
//! Pages are addressed by a 1-based row offset rather than a page number:
//! `/actions/11` with a page size of 10 shows rows 11-20.

use ch_common::db::{Query, RowSet, Window};
use serde::Serialize;
use sqlx::SqlitePool;

/// Number of page links shown before (and after) the current position
pub const LINK_SPAN: i64 = 5;

/// A numbered link to a page starting at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub offset: i64,
    pub number: i64,
}

/// Navigation metadata for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Current 1-based row offset
    pub offset: i64,
    pub limit: i64,
    /// Total number of rows
    pub row_count: i64,
    pub links: Vec<PageLink>,
    pub has_next: bool,
    pub next: i64,
    pub has_prev: bool,
    pub prev: i64,
}

/// Calculate navigation for `row_count` rows viewed at `offset`
///
/// The offset is clamped to `1..=row_count`. Links start up to
/// [`LINK_SPAN`] pages back, run up to [`LINK_SPAN`] pages ahead and never
/// point past the last row.
///
/// # Examples
/// ```
/// use ch_analytics::pagination::calculate_page;
///
/// // 45 rows, 10 per page, looking at rows 21-30
/// let p = calculate_page(45, 21, 10);
/// assert!(p.has_next && p.has_prev);
/// assert_eq!(p.next, 31);
/// assert_eq!(p.prev, 11);
/// assert_eq!(p.links.len(), 5);
/// ```
pub fn calculate_page(row_count: i64, offset: i64, limit: i64) -> PageMeta {
    let row_count = row_count.max(0);
    let offset = offset.clamp(1, row_count.max(1));
    let limit = limit.max(1);

    let span = limit.saturating_mul(LINK_SPAN);
    let first = offset.saturating_sub(span).max(1);
    let end = offset
        .saturating_add(span)
        .saturating_add(1)
        .min(row_count.saturating_add(1));
    let links = (first..end)
        .step_by(usize::try_from(limit).unwrap_or(usize::MAX))
        .map(|o| PageLink {
            offset: o,
            number: (o - 1) / limit + 1,
        })
        .collect();

    PageMeta {
        offset,
        limit,
        row_count,
        links,
        has_next: offset.saturating_add(limit - 1) < row_count,
        next: offset.saturating_add(limit),
        has_prev: offset > 1,
        prev: offset.saturating_sub(limit).max(1),
    }
}

/// Rows plus navigation for one page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: RowSet,
    pub meta: PageMeta,
}

/// Fetch the page of `query` starting at 1-based `offset`
pub async fn fetch_page(
    query: &Query,
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> ch_common::Result<Page> {
    let row_count = query.count(pool).await?;
    let meta = calculate_page(row_count, offset, limit);
    let items = query
        .all(
            pool,
            Some(Window {
                limit: meta.limit,
                offset: meta.offset - 1,
            }),
        )
        .await?;
    Ok(Page { items, meta })
}
