//! # CitizenHelper Analytics Common Library
//!
//! Shared code for the analytics dashboard:
//! - Majority-vote aggregation and dataset export (`votes`)
//! - Typed, parameterized query building (`db`)
//! - Statistics math (`stats`)
//! - Basic-auth helpers (`api`)
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod stats;
pub mod votes;

pub use error::{Error, Result};
