//! HTTP handlers for ch-analytics

pub mod auth;
pub mod browse;
pub mod export;
pub mod health;
pub mod statistics;

pub use auth::auth_middleware;
pub use browse::{actions_page, actions_redirect, documents_page, documents_redirect};
pub use export::export_dataset;
pub use health::health_routes;
pub use statistics::{statistics_json, statistics_page};
