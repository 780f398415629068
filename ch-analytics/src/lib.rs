//! ch-analytics library - annotation analytics dashboard
//!
//! Read-only views over the annotation tool database and the action
//! datastore, plus the majority-vote dataset export.

use std::sync::Arc;

use axum::Router;
use ch_common::config::DashboardConfig;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod pages;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Annotation tool database (read-only)
    pub annotations: SqlitePool,
    /// Action log datastore (read-only)
    pub datastore: SqlitePool,
    pub config: Arc<DashboardConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(annotations: SqlitePool, datastore: SqlitePool, config: DashboardConfig) -> Self {
        Self {
            annotations,
            datastore,
            config: Arc::new(config),
        }
    }
}

/// Build application router
///
/// Everything except `/health` sits behind basic auth.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::get;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/", get(api::statistics_page))
        .route("/api/statistics", get(api::statistics_json))
        .route("/actions", get(api::actions_redirect))
        .route("/actions/:offset", get(api::actions_page))
        .route("/documents", get(api::documents_redirect))
        .route("/documents/:offset", get(api::documents_page))
        .route("/export", get(api::export_dataset))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
