//! Dataset serialization for majority-vote decisions

use serde::Serialize;

use super::policy::DocumentDecision;
use crate::{Error, Result};

/// Message returned when no export format was requested
pub const INSTRUCTIONS: &str = "Choose an export format with the `format` query parameter:\n\
    \x20 format=json   a single JSON array of decisions\n\
    \x20 format=jsonl  one JSON decision per line\n\
    \x20 format=csv    one row per decision with a header line\n";

/// Wire encoding of an exported dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Jsonl,
    Csv,
}

impl ExportFormat {
    /// Resolve the caller's mode; `None` for unset or unrecognized modes
    pub fn from_mode(mode: Option<&str>) -> Option<Self> {
        let mode = mode?.trim();
        if mode.eq_ignore_ascii_case("json") {
            Some(ExportFormat::Json)
        } else if mode.eq_ignore_ascii_case("jsonl") {
            Some(ExportFormat::Jsonl)
        } else if mode.eq_ignore_ascii_case("csv") {
            Some(ExportFormat::Csv)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Jsonl => "application/x-ndjson",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Jsonl => "jsonl",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Serialize `decisions` in the given format
pub fn render(format: ExportFormat, decisions: &[DocumentDecision]) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => write_json(decisions),
        ExportFormat::Jsonl => write_jsonl(decisions),
        ExportFormat::Csv => write_csv(decisions),
    }
}

fn write_json(decisions: &[DocumentDecision]) -> Result<Vec<u8>> {
    serde_json::to_vec(decisions).map_err(|e| Error::Export(e.to_string()))
}

fn write_jsonl(decisions: &[DocumentDecision]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for decision in decisions {
        serde_json::to_writer(&mut out, decision).map_err(|e| Error::Export(e.to_string()))?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Flat row; nested maps are carried as JSON text
#[derive(Serialize)]
struct CsvRow<'a> {
    tweet_id: &'a str,
    labels: String,
    votes: String,
    annotations: String,
    text: &'a str,
}

fn write_csv(decisions: &[DocumentDecision]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if decisions.is_empty() {
        writer
            .write_record(["tweet_id", "labels", "votes", "annotations", "text"])
            .map_err(|e| Error::Export(e.to_string()))?;
    }

    for decision in decisions {
        let labels: Vec<&str> = decision.labels.iter().map(|l| l.as_str()).collect();
        let row = CsvRow {
            tweet_id: &decision.external_id,
            labels: labels.join("|"),
            votes: serde_json::to_string(&decision.votes)
                .map_err(|e| Error::Export(e.to_string()))?,
            annotations: serde_json::to_string(&decision.annotations)
                .map_err(|e| Error::Export(e.to_string()))?,
            text: &decision.text,
        };
        writer.serialize(row).map_err(|e| Error::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Export(e.to_string()))
}
