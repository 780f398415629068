//! Dashboard statistics
//!
//! Rates are `None` whenever their denominator is zero; callers render that
//! as "N/A" instead of dividing.

use serde::Serialize;

use crate::votes::{DocumentBallots, Label, MAJORITY};

/// `part * 100 / whole`, or None for an empty whole
pub fn percentage(part: i64, whole: i64) -> Option<f64> {
    if whole <= 0 {
        None
    } else {
        Some(part as f64 * 100.0 / whole as f64)
    }
}

/// Overall annotation progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionStats {
    /// Documents with at least one annotation
    pub completed: i64,
    /// All documents
    pub count: i64,
    pub percentage: Option<f64>,
}

impl CompletionStats {
    pub fn new(completed: i64, count: i64) -> Self {
        Self {
            completed,
            count,
            percentage: percentage(completed, count),
        }
    }
}

/// Progress of one annotator across their projects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProgress {
    pub username: String,
    pub total: i64,
    pub completed: i64,
    pub percentage: Option<f64>,
}

impl UserProgress {
    pub fn new(username: String, total: i64, completed: i64) -> Self {
        Self {
            username,
            total,
            completed,
            percentage: percentage(completed, total),
        }
    }
}

/// Agreement proxy for one label
///
/// Among documents with at least two annotators where someone used the
/// label, the share where at least [`MAJORITY`] annotators used it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAgreement {
    pub label: Label,
    pub documents: i64,
    pub agreed: i64,
    pub rate: Option<f64>,
}

pub fn label_agreement(documents: &[DocumentBallots]) -> Vec<LabelAgreement> {
    Label::ALL
        .iter()
        .map(|label| {
            let mut used = 0;
            let mut agreed = 0;
            for document in documents.iter().filter(|d| d.voter_count() >= 2) {
                let votes = document.ballots.iter().filter(|b| b.has(*label)).count() as u32;
                if votes > 0 {
                    used += 1;
                    if votes >= MAJORITY {
                        agreed += 1;
                    }
                }
            }
            LabelAgreement {
                label: *label,
                documents: used,
                agreed,
                rate: percentage(agreed, used),
            }
        })
        .collect()
}

/// Everything the statistics page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub annotations: CompletionStats,
    pub users: Vec<UserProgress>,
    pub agreement: Vec<LabelAgreement>,
}
