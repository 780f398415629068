//! Ballot grouping
//!
//! Folds a flat, unordered stream of annotation records into one ballot per
//! (document, annotator) pair. Documents and annotators keep the order in
//! which they were first seen.

use std::collections::{BTreeMap, HashMap};

use super::labels::Label;
use super::record::AnnotationRecord;
use crate::{Error, Result};

/// One annotator's label markings for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterBallot {
    pub voter_id: String,
    /// Label presence; only ever holds `true` entries
    pub marks: BTreeMap<Label, bool>,
}

impl VoterBallot {
    pub fn new(voter_id: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            marks: BTreeMap::new(),
        }
    }

    /// Record `label` as present. Marking twice is a no-op.
    pub fn mark(&mut self, label: Label) {
        self.marks.insert(label, true);
    }

    pub fn has(&self, label: Label) -> bool {
        self.marks.get(&label).copied().unwrap_or(false)
    }
}

/// All ballots cast on one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBallots {
    pub document_id: i64,
    /// Tweet id from the first record seen for the document
    pub external_id: String,
    /// Text from the first record seen for the document
    pub text: String,
    pub ballots: Vec<VoterBallot>,
}

impl DocumentBallots {
    fn ballot_mut(&mut self, voter_id: &str) -> &mut VoterBallot {
        let index = match self.ballots.iter().position(|b| b.voter_id == voter_id) {
            Some(index) => index,
            None => {
                self.ballots.push(VoterBallot::new(voter_id));
                self.ballots.len() - 1
            }
        };
        &mut self.ballots[index]
    }

    /// Number of distinct annotators
    pub fn voter_count(&self) -> usize {
        self.ballots.len()
    }

    pub fn has_voter(&self, voter_id: &str) -> bool {
        self.ballots.iter().any(|b| b.voter_id == voter_id)
    }
}

/// Group annotation records into per-document ballots
///
/// Fails on the first record whose label is outside the recognized set; no
/// partial grouping is returned.
pub fn group_ballots<I>(records: I) -> Result<Vec<DocumentBallots>>
where
    I: IntoIterator<Item = AnnotationRecord>,
{
    let mut documents: Vec<DocumentBallots> = Vec::new();
    let mut index_by_id: HashMap<i64, usize> = HashMap::new();

    for record in records {
        let label: Label = record.label.parse().map_err(|_| Error::InvalidLabel {
            label: record.label.clone(),
            document_id: record.document_id,
            voter_id: record.voter_id.clone(),
        })?;

        let index = *index_by_id.entry(record.document_id).or_insert_with(|| {
            documents.push(DocumentBallots {
                document_id: record.document_id,
                external_id: record.document_metadata.tweet_id.clone(),
                text: record.document_text.clone(),
                ballots: Vec::new(),
            });
            documents.len() - 1
        });

        documents[index].ballot_mut(&record.voter_id).mark(label);
    }

    Ok(documents)
}
