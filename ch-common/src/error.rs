//! Common error types for CitizenHelper analytics

use thiserror::Error;

/// Common result type for analytics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the analytics crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Annotation label outside the recognized label set
    ///
    /// Aborts the whole export pass; never used to drop a single vote.
    #[error("Invalid label '{label}' on document {document_id} (annotator '{voter_id}')")]
    InvalidLabel {
        label: String,
        document_id: i64,
        voter_id: String,
    },

    /// Document metadata missing or not parseable
    #[error("Invalid metadata on document {document_id}: {reason}")]
    InvalidMetadata { document_id: i64, reason: String },

    /// Identifier rejected by the query builder
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Dataset serialization failure
    #[error("Export error: {0}")]
    Export(String),
}

impl Error {
    /// True for errors caused by the annotation data itself rather than the
    /// environment (bad labels, unreadable metadata).
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Error::InvalidLabel { .. } | Error::InvalidMetadata { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_label_message_names_label() {
        let err = Error::InvalidLabel {
            label: "Spam".to_string(),
            document_id: 7,
            voter_id: "alice".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'Spam'"));
        assert!(msg.contains("document 7"));
        assert!(msg.contains("alice"));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_config_error_is_not_data_integrity() {
        assert!(!Error::Config("missing".to_string()).is_data_integrity());
    }
}
