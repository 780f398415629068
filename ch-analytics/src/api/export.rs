//! Majority-vote dataset export
//!
//! `GET /export?format=json|jsonl|csv[&expert=<username>]`
//!
//! Without a recognized format the endpoint returns usage instructions and
//! does not touch the database.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use ch_common::votes::{aggregate, export, ExportFormat, INSTRUCTIONS};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{db, AppState};

/// Response header carrying the one-line aggregation summary
pub const SUMMARY_HEADER: &str = "x-export-summary";

/// Query parameters for export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Output mode: json, jsonl or csv
    pub format: Option<String>,
    /// Overrides the configured expert username for this request
    pub expert: Option<String>,
}

/// GET /export
pub async fn export_dataset(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ExportError> {
    let Some(format) = ExportFormat::from_mode(query.format.as_deref()) else {
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            INSTRUCTIONS,
        )
            .into_response());
    };

    let expert = query
        .expert
        .filter(|e| !e.trim().is_empty())
        .or_else(|| state.config.expert_username.clone());

    let records = db::fetch_annotation_records(&state.annotations).await?;
    let record_count = records.len();
    let aggregation = aggregate(records, expert.as_deref())?;

    let summary = aggregation.summary();
    info!(records = record_count, format = format.extension(), "{}", summary);

    let body = export::render(format, &aggregation.decisions)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(format.content_type()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!(
            "attachment; filename=\"dataset.{}\"",
            format.extension()
        ))
        .map_err(|e| ExportError::Internal(e.to_string()))?,
    );
    headers.insert(
        HeaderName::from_static(SUMMARY_HEADER),
        HeaderValue::from_str(&summary).map_err(|e| ExportError::Internal(e.to_string()))?,
    );

    Ok((StatusCode::OK, headers, body).into_response())
}

/// Export errors
#[derive(Debug)]
pub enum ExportError {
    /// Annotation data violates the label set or metadata format
    InvalidData(String),
    DatabaseError(String),
    Internal(String),
}

impl From<ch_common::Error> for ExportError {
    fn from(e: ch_common::Error) -> Self {
        if e.is_data_integrity() {
            return ExportError::InvalidData(e.to_string());
        }
        match e {
            ch_common::Error::Database(e) => ExportError::DatabaseError(e.to_string()),
            e => ExportError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ExportError::InvalidData(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ExportError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ExportError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        error!("Export failed: {}", message);

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
