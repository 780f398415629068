//! Basic-auth middleware for ch-analytics
//!
//! Credentials come from the `[[users]]` table of the config file. With no
//! users configured, authentication is disabled.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use ch_common::api::auth::{parse_basic_authorization, verify_credentials};
use serde_json::json;
use tracing::warn;

use crate::AppState;

const REALM: &str = "Basic realm=\"CitizenHelper Analytics\", charset=\"UTF-8\"";

/// Authentication middleware
///
/// Returns 401 with a `WWW-Authenticate` challenge when credentials are
/// missing or wrong.
///
/// **Note:** This is applied to protected routes only.
/// Health endpoint (/health) does NOT use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.config.auth_enabled() {
        return Ok(next.run(request).await);
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::Malformed("non-ASCII authorization header".to_string()))?;

    let (username, password) =
        parse_basic_authorization(header_value).map_err(|e| AuthError::Malformed(e.to_string()))?;

    if !verify_credentials(&state.config.users, &username, &password) {
        warn!(username = %username, "Rejected dashboard login");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(next.run(request).await)
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
    Malformed(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredentials => "Authentication required".to_string(),
            AuthError::InvalidCredentials => "Invalid username or password".to_string(),
            AuthError::Malformed(msg) => format!("Malformed credentials: {}", msg),
        };

        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": message,
            })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
        response
    }
}
