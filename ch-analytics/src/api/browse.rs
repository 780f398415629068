//! Paginated browsing of the action log and the document table

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use ch_common::db::{Direction, Query};
use serde_json::json;
use sqlx::SqlitePool;

use crate::pagination::fetch_page;
use crate::{pages, AppState};

/// Action log table in the datastore
pub const ACTIONS_TABLE: &str = "document_annotations";

/// Document table in the annotation database
pub const DOCUMENTS_TABLE: &str = "api_document";

/// GET /actions
pub async fn actions_redirect() -> Redirect {
    Redirect::to("/actions/1")
}

/// GET /documents
pub async fn documents_redirect() -> Redirect {
    Redirect::to("/documents/1")
}

/// GET /actions/:offset
///
/// Newest actions first.
pub async fn actions_page(
    State(state): State<AppState>,
    Path(offset): Path<i64>,
) -> Result<Html<String>, BrowseError> {
    let query = Query::table(ACTIONS_TABLE)?.order_by("timestamp", Direction::Desc)?;
    render(&state, &state.datastore, &query, offset, "Actions", "actions").await
}

/// GET /documents/:offset
pub async fn documents_page(
    State(state): State<AppState>,
    Path(offset): Path<i64>,
) -> Result<Html<String>, BrowseError> {
    let query = Query::table(DOCUMENTS_TABLE)?;
    render(&state, &state.annotations, &query, offset, "Documents", "documents").await
}

async fn render(
    state: &AppState,
    pool: &SqlitePool,
    query: &Query,
    offset: i64,
    heading: &str,
    page_key: &str,
) -> Result<Html<String>, BrowseError> {
    let page = fetch_page(query, pool, offset, state.config.page_size).await?;
    let body = pages::table_body(heading, &format!("/{}", page_key), &page.items, &page.meta);
    Ok(Html(pages::layout(
        &state.config.page_title(Some(heading)),
        page_key,
        &body,
    )))
}

/// Browse errors
#[derive(Debug)]
pub enum BrowseError {
    DatabaseError(String),
}

impl From<ch_common::Error> for BrowseError {
    fn from(e: ch_common::Error) -> Self {
        BrowseError::DatabaseError(e.to_string())
    }
}

impl IntoResponse for BrowseError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            BrowseError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
