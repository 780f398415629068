//! Statistics page: completion, per-annotator progress and label agreement

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use ch_common::stats::{label_agreement, Statistics};
use ch_common::votes::group_ballots;
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::{db, pages, AppState};

/// Statistics plus the reason agreement could not be computed, if any
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    #[serde(flatten)]
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_error: Option<String>,
}

async fn collect(state: &AppState) -> Result<StatisticsResponse, StatsError> {
    let annotations = db::fetch_completion(&state.annotations).await?;
    let users = db::fetch_user_progress(&state.annotations).await?;

    // Bad annotation data hides the agreement table but not the page.
    let grouped = db::fetch_annotation_records(&state.annotations)
        .await
        .and_then(group_ballots);
    let (agreement, agreement_error) = match grouped {
        Ok(documents) => (label_agreement(&documents), None),
        Err(e) if e.is_data_integrity() => {
            warn!("Agreement statistics skipped: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(StatisticsResponse {
        statistics: Statistics {
            annotations,
            users,
            agreement,
        },
        agreement_error,
    })
}

/// GET /
pub async fn statistics_page(State(state): State<AppState>) -> Result<Html<String>, StatsError> {
    let response = collect(&state).await?;
    let body = pages::statistics_body(&response.statistics, response.agreement_error.as_deref());
    Ok(Html(pages::layout(
        &state.config.page_title(Some("Home")),
        "index",
        &body,
    )))
}

/// GET /api/statistics
pub async fn statistics_json(
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, StatsError> {
    Ok(Json(collect(&state).await?))
}

/// Statistics errors
#[derive(Debug)]
pub enum StatsError {
    DatabaseError(String),
}

impl From<ch_common::Error> for StatsError {
    fn from(e: ch_common::Error) -> Self {
        StatsError::DatabaseError(e.to_string())
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            StatsError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
