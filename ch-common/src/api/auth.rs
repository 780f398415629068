//! HTTP Basic authentication
//!
//! Passwords are never stored in clear: the configuration holds SHA-256 hex
//! digests and incoming passwords are hashed before comparison.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies; the axum middleware lives in the dashboard.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::config::Credential;

// ========================================
// Error Types
// ========================================

/// Reasons an `Authorization` header is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasicAuthError {
    /// Scheme is not `Basic`
    UnsupportedScheme,
    /// Payload is not valid base64 / UTF-8
    Malformed(String),
    /// Decoded payload has no `:` separator
    MissingSeparator,
}

impl std::fmt::Display for BasicAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BasicAuthError::UnsupportedScheme => write!(f, "Unsupported authorization scheme"),
            BasicAuthError::Malformed(err) => write!(f, "Malformed credentials: {}", err),
            BasicAuthError::MissingSeparator => write!(f, "Credentials missing ':' separator"),
        }
    }
}

impl std::error::Error for BasicAuthError {}

// ========================================
// Hashing
// ========================================

/// SHA-256 of `password` as 64 lowercase hex characters
///
/// # Examples
///
/// ```
/// use ch_common::api::auth::hash_password;
///
/// let hash = hash_password("password");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8");
/// ```
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ========================================
// Header Parsing
// ========================================

/// Decode an `Authorization: Basic <base64>` header value into
/// `(username, password)`
///
/// The password may itself contain `:`; only the first one separates.
pub fn parse_basic_authorization(header: &str) -> Result<(String, String), BasicAuthError> {
    let (scheme, payload) = header
        .trim()
        .split_once(' ')
        .ok_or(BasicAuthError::UnsupportedScheme)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(BasicAuthError::UnsupportedScheme);
    }

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|e| BasicAuthError::Malformed(e.to_string()))?;
    let decoded = String::from_utf8(decoded).map_err(|e| BasicAuthError::Malformed(e.to_string()))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(BasicAuthError::MissingSeparator)?;
    Ok((username.to_string(), password.to_string()))
}

/// Check a username/password pair against the configured users
pub fn verify_credentials(users: &[Credential], username: &str, password: &str) -> bool {
    let provided = hash_password(password);
    users.iter().any(|user| {
        user.username == username && constant_time_eq(&user.password_sha256, &provided)
    })
}

fn constant_time_eq(expected: &str, provided: &str) -> bool {
    let expected = expected.trim().to_ascii_lowercase();
    if expected.len() != provided.len() {
        return false;
    }
    expected
        .bytes()
        .zip(provided.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
