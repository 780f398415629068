//! Raw annotation records as read from the annotation database

use serde_json::Value;

use crate::{Error, Result};

/// Parsed form of a document's `meta` column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// External tweet identifier (`id` in the metadata)
    pub tweet_id: String,
    /// Original creation timestamp as stored, if present
    pub created_at: Option<String>,
}

impl DocumentMetadata {
    /// Parse the JSON metadata payload of `document_id`
    ///
    /// `id` may be stored as a string or an integer; tweet ids exceed the
    /// f64-safe range, so integers are kept in their decimal text form.
    pub fn parse(document_id: i64, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|e| Error::InvalidMetadata {
            document_id,
            reason: e.to_string(),
        })?;

        let tweet_id = match value.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(Error::InvalidMetadata {
                    document_id,
                    reason: format!("unsupported id value {}", other),
                })
            }
            None => {
                return Err(Error::InvalidMetadata {
                    document_id,
                    reason: "missing id".to_string(),
                })
            }
        };

        let created_at = value
            .get("created_at")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            tweet_id,
            created_at,
        })
    }
}

/// One raw vote: a single label applied by one annotator to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub document_id: i64,
    pub voter_id: String,
    /// Label text as stored; validated during grouping
    pub label: String,
    pub document_text: String,
    pub document_metadata: DocumentMetadata,
}
