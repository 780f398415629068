//! Database access helpers

pub mod query;

pub use query::{validate_identifier, Direction, Projection, Query, RowSet, SqlValue, Window};
