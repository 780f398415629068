//! Record source for the dataset export
//!
//! Reads one row per (document, annotator, label) from the annotation tool
//! schema and converts it into the typed records the vote aggregator consumes.

use ch_common::votes::{AnnotationRecord, DocumentMetadata};
use sqlx::{Row, SqlitePool};

/// Raw joined row, before metadata parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRow {
    pub document_id: i64,
    pub text: String,
    pub meta: String,
    pub label: String,
    pub username: String,
}

impl AnnotationRow {
    pub fn into_record(self) -> ch_common::Result<AnnotationRecord> {
        let document_metadata = DocumentMetadata::parse(self.document_id, &self.meta)?;
        Ok(AnnotationRecord {
            document_id: self.document_id,
            voter_id: self.username,
            label: self.label,
            document_text: self.text,
            document_metadata,
        })
    }
}

/// Every annotation in insertion order
pub async fn fetch_annotation_rows(pool: &SqlitePool) -> ch_common::Result<Vec<AnnotationRow>> {
    let rows = sqlx::query(
        "SELECT d.id, d.text, d.meta, l.text, u.username
         FROM api_documentannotation a
         JOIN api_document d ON d.id = a.document_id
         JOIN api_label l ON l.id = a.label_id
         JOIN auth_user u ON u.id = a.user_id
         ORDER BY a.id",
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> ch_common::Result<AnnotationRow> {
            Ok(AnnotationRow {
                document_id: row.try_get(0)?,
                text: row.try_get::<Option<String>, _>(1)?.unwrap_or_default(),
                meta: row
                    .try_get::<Option<String>, _>(2)?
                    .unwrap_or_else(|| "{}".to_string()),
                label: row.try_get(3)?,
                username: row.try_get(4)?,
            })
        })
        .collect()
}

/// Rows converted to records; fails on the first unparseable metadata
pub async fn fetch_annotation_records(
    pool: &SqlitePool,
) -> ch_common::Result<Vec<AnnotationRecord>> {
    fetch_annotation_rows(pool)
        .await?
        .into_iter()
        .map(AnnotationRow::into_record)
        .collect()
}
