//! Shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY pure functions and shared types, no HTTP
//! framework dependencies. The dashboard wraps these with axum middleware.

pub mod auth;

pub use auth::{hash_password, parse_basic_authorization, verify_credentials, BasicAuthError};
