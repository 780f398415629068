//! Aggregate progress queries over the annotation tool schema
//!
//! Percentages are computed in Rust from the raw counts so an empty database
//! yields "no rate" rather than a SQL division by zero.

use ch_common::stats::{CompletionStats, UserProgress};
use sqlx::{Row, SqlitePool};

/// Documents with at least one annotation versus all documents
pub async fn fetch_completion(pool: &SqlitePool) -> ch_common::Result<CompletionStats> {
    let row = sqlx::query(
        "SELECT COUNT(DISTINCT a.document_id), COUNT(DISTINCT d.id)
         FROM api_document d
         LEFT JOIN api_documentannotation a ON a.document_id = d.id",
    )
    .fetch_one(pool)
    .await?;

    Ok(CompletionStats::new(row.try_get(0)?, row.try_get(1)?))
}

/// Per-annotator progress over the documents of the projects they belong to
pub async fn fetch_user_progress(pool: &SqlitePool) -> ch_common::Result<Vec<UserProgress>> {
    let rows = sqlx::query(
        "SELECT u.username, COUNT(DISTINCT d.id), COUNT(DISTINCT a.document_id)
         FROM auth_user u
         JOIN api_project_users pu ON pu.user_id = u.id
         JOIN api_document d ON d.project_id = pu.project_id
         LEFT JOIN api_documentannotation a ON a.document_id = d.id AND a.user_id = u.id
         GROUP BY u.id, u.username
         ORDER BY u.username",
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> ch_common::Result<UserProgress> {
            Ok(UserProgress::new(row.try_get(0)?, row.try_get(1)?, row.try_get(2)?))
        })
        .collect()
}
