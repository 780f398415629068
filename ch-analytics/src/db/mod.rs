//! Database access layer for ch-analytics
//!
//! All connections are read-only: the dashboard never writes to either
//! database.

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::path::Path;

pub mod annotations;
pub mod statistics;

pub use annotations::{fetch_annotation_records, fetch_annotation_rows, AnnotationRow};
pub use statistics::{fetch_completion, fetch_user_progress};

/// Open a read-only pool on an existing SQLite file
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .immutable(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("Failed to open {} in read-only mode", db_path.display()))?;

    // Verify read-only by attempting a write (should fail)
    #[cfg(debug_assertions)]
    {
        let write_test = sqlx::query("CREATE TABLE _ch_write_probe (id INTEGER)")
            .execute(&pool)
            .await;
        if write_test.is_ok() {
            anyhow::bail!("Connection to {} is not read-only", db_path.display());
        }
    }

    Ok(pool)
}
