//! Typed query builder for read-only table browsing
//!
//! Identifiers are validated and quoted; every value travels as a bound
//! parameter. Nothing user-supplied is ever interpolated into SQL text.

use serde_json::Value;

use crate::{Error, Result};

#[cfg(feature = "sqlx")]
use serde_json::{json, Map};
#[cfg(feature = "sqlx")]
use sqlx::{sqlite::SqliteRow, Column, Row, SqlitePool, ValueRef};

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

/// What the SELECT returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    AllColumns,
    Count,
}

/// LIMIT/OFFSET window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

/// SQL text plus its parameters, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

/// Validate a table or column name
///
/// Only alphanumerics and underscore, non-empty, shorter than 100 chars.
pub fn validate_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() < 100
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

/// Equality filters and ordering over a single table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    filters: Vec<(String, SqlValue)>,
    order: Vec<(String, Direction)>,
}

impl Query {
    pub fn table(name: &str) -> Result<Self> {
        validate_identifier(name)?;
        Ok(Self {
            table: name.to_string(),
            filters: Vec::new(),
            order: Vec::new(),
        })
    }

    /// Add `column = value` (AND-combined with other filters)
    pub fn filter(mut self, column: &str, value: impl Into<SqlValue>) -> Result<Self> {
        validate_identifier(column)?;
        self.filters.push((column.to_string(), value.into()));
        Ok(self)
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Result<Self> {
        validate_identifier(column)?;
        self.order.push((column.to_string(), direction));
        Ok(self)
    }

    pub fn build(&self, projection: Projection, window: Option<Window>) -> BuiltQuery {
        let select = match projection {
            Projection::AllColumns => "*",
            Projection::Count => "COUNT(*)",
        };
        let mut sql = format!("SELECT {} FROM {}", select, quote(&self.table));
        let mut binds = Vec::new();

        if !self.filters.is_empty() {
            let clauses: Vec<String> = self
                .filters
                .iter()
                .map(|(column, _)| format!("{} = ?", quote(column)))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
            binds.extend(self.filters.iter().map(|(_, value)| value.clone()));
        }

        // Ordering is meaningless for a count.
        if projection == Projection::AllColumns && !self.order.is_empty() {
            let clauses: Vec<String> = self
                .order
                .iter()
                .map(|(column, direction)| format!("{} {}", quote(column), direction.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&clauses.join(", "));
        }

        if let Some(window) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(SqlValue::Integer(window.limit));
            binds.push(SqlValue::Integer(window.offset.max(0)));
        }

        BuiltQuery { sql, binds }
    }
}

/// Column names plus rows of JSON-converted cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[cfg(feature = "sqlx")]
impl BuiltQuery {
    fn prepare(&self) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for value in &self.binds {
            query = match value {
                SqlValue::Integer(v) => query.bind(*v),
                SqlValue::Real(v) => query.bind(*v),
                SqlValue::Text(v) => query.bind(v.as_str()),
            };
        }
        query
    }
}

#[cfg(feature = "sqlx")]
impl Query {
    /// Number of rows matching the filters
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64> {
        let built = self.build(Projection::Count, None);
        let row = built.prepare().fetch_one(pool).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    /// Rows in the window (all rows when `window` is None)
    pub async fn all(&self, pool: &SqlitePool, window: Option<Window>) -> Result<RowSet> {
        let built = self.build(Projection::AllColumns, window);
        let rows = built.prepare().fetch_all(pool).await?;

        let columns = match rows.first() {
            Some(first) => first.columns().iter().map(|c| c.name().to_string()).collect(),
            None => self.columns(pool).await?,
        };

        Ok(RowSet {
            columns,
            rows: rows.iter().map(row_to_json).collect(),
        })
    }

    /// First matching row as a column → value map
    pub async fn one(&self, pool: &SqlitePool) -> Result<Option<Map<String, Value>>> {
        let built = self.build(Projection::AllColumns, Some(Window { limit: 1, offset: 0 }));
        let row = built.prepare().fetch_optional(pool).await?;
        Ok(row.map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_lowercase())
                .zip(row_to_json(&row))
                .collect()
        }))
    }

    /// Column names from the table schema
    pub async fn columns(&self, pool: &SqlitePool) -> Result<Vec<String>> {
        // PRAGMA does not accept bound parameters; the name was validated in `table()`.
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quote(&self.table)))
            .fetch_all(pool)
            .await?;
        // PRAGMA table_info returns: (cid, name, type, notnull, dflt_value, pk)
        Ok(rows
            .iter()
            .map(|row| row.try_get::<String, _>(1))
            .collect::<std::result::Result<Vec<String>, sqlx::Error>>()?)
    }
}

/// Convert a SQLite row to JSON cells, trying text, integer, then real
#[cfg(feature = "sqlx")]
pub fn row_to_json(row: &SqliteRow) -> Vec<Value> {
    (0..row.len())
        .map(|i| {
            row.try_get_raw(i)
                .ok()
                .and_then(|raw| {
                    if raw.is_null() {
                        Some(Value::Null)
                    } else {
                        row.try_get::<String, _>(i)
                            .ok()
                            .map(Value::String)
                            .or_else(|| row.try_get::<i64, _>(i).ok().map(|v| json!(v)))
                            .or_else(|| row.try_get::<f64, _>(i).ok().map(|v| json!(v)))
                    }
                })
                .unwrap_or(Value::Null)
        })
        .collect()
}
