//! Majority-vote decision policy
//!
//! Reduces one document's ballots to at most one [`DocumentDecision`].
//! Thresholds are flat vote counts and do not scale with panel size.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ballot::{group_ballots, DocumentBallots};
use super::labels::{Label, LabelKind};
use super::record::AnnotationRecord;
use crate::Result;

/// Minimum number of distinct annotators for a document to be decided
pub const QUORUM: usize = 3;

/// Minimum number of annotators that must mark a label for it to be kept
pub const MAJORITY: u32 = 2;

/// Per-label vote counts for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTally {
    /// Count for every recognized label, zero included
    pub counts: BTreeMap<Label, u32>,
    pub voters: usize,
    pub has_expert: bool,
}

impl DocumentTally {
    pub fn from_ballots(document: &DocumentBallots, expert: Option<&str>) -> Self {
        let mut counts: BTreeMap<Label, u32> = Label::ALL.iter().map(|l| (*l, 0)).collect();
        for ballot in &document.ballots {
            for (label, present) in &ballot.marks {
                if *present {
                    *counts.entry(*label).or_insert(0) += 1;
                }
            }
        }

        Self {
            counts,
            voters: document.voter_count(),
            has_expert: expert.is_some_and(|e| document.has_voter(e)),
        }
    }

    pub fn count(&self, label: Label) -> u32 {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    fn reaches_majority(&self, label: Label) -> bool {
        self.count(label) >= MAJORITY
    }

    /// Labels of `kind` that reached [`MAJORITY`], in output order
    fn majority_labels(&self, kind: LabelKind) -> impl Iterator<Item = Label> + '_ {
        Label::ALL
            .into_iter()
            .filter(move |label| label.kind() == kind && self.reaches_majority(*label))
    }
}

/// Finalized labels for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDecision {
    #[serde(skip)]
    pub document_id: i64,
    #[serde(rename = "tweet_id")]
    pub external_id: String,
    pub votes: BTreeMap<Label, u32>,
    pub labels: Vec<Label>,
    /// Annotator → label presence
    pub annotations: BTreeMap<String, BTreeMap<Label, bool>>,
    pub text: String,
}

/// Outcome of the policy for a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(DocumentDecision),
    /// The expert annotated this document
    ExpertAnnotated,
    /// Fewer than [`QUORUM`] annotators
    InsufficientQuorum,
    /// No category label reached [`MAJORITY`]
    Undetermined,
}

/// Apply the policy to one document
pub fn decide(document: &DocumentBallots, expert: Option<&str>) -> Verdict {
    let tally = DocumentTally::from_ballots(document, expert);

    // Expert check comes before quorum so excluded documents touch no counter.
    if tally.has_expert {
        return Verdict::ExpertAnnotated;
    }
    if tally.voters < QUORUM {
        return Verdict::InsufficientQuorum;
    }

    // Irrelevant overrides every other category.
    let mut labels: Vec<Label> = if tally.reaches_majority(Label::Irrelevant) {
        vec![Label::Irrelevant]
    } else {
        tally.majority_labels(LabelKind::Category).collect()
    };
    if labels.is_empty() {
        return Verdict::Undetermined;
    }

    labels.extend(tally.majority_labels(LabelKind::Sentiment));

    let annotations = document
        .ballots
        .iter()
        .map(|b| (b.voter_id.clone(), b.marks.clone()))
        .collect();

    Verdict::Accepted(DocumentDecision {
        document_id: document.document_id,
        external_id: document.external_id.clone(),
        votes: tally.counts,
        labels,
        annotations,
        text: document.text.clone(),
    })
}

/// Result of one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Decisions in first-seen document order
    pub decisions: Vec<DocumentDecision>,
    /// Documents dropped for lack of quorum
    pub skipped: usize,
    /// Documents dropped without a majority category
    pub invalid: usize,
    /// Documents dropped because the expert annotated them
    pub expert_excluded: usize,
}

impl Aggregation {
    /// One-line human-readable report of the pass
    pub fn summary(&self) -> String {
        format!(
            "exported {} documents; skipped {} with fewer than {} annotators; dropped {} without a majority category; excluded {} annotated by the expert",
            self.decisions.len(),
            self.skipped,
            QUORUM,
            self.invalid,
            self.expert_excluded
        )
    }
}

/// Apply the policy to already-grouped documents
pub fn aggregate_documents(documents: &[DocumentBallots], expert: Option<&str>) -> Aggregation {
    let mut result = Aggregation::default();
    for document in documents {
        match decide(document, expert) {
            Verdict::Accepted(decision) => result.decisions.push(decision),
            Verdict::ExpertAnnotated => result.expert_excluded += 1,
            Verdict::InsufficientQuorum => {
                debug!(
                    document_id = document.document_id,
                    voters = document.voter_count(),
                    "below quorum"
                );
                result.skipped += 1;
            }
            Verdict::Undetermined => {
                debug!(document_id = document.document_id, "no majority category");
                result.invalid += 1;
            }
        }
    }
    result
}

/// Group raw records and apply the policy: the full aggregation pass
pub fn aggregate<I>(records: I, expert: Option<&str>) -> Result<Aggregation>
where
    I: IntoIterator<Item = AnnotationRecord>,
{
    let documents = group_ballots(records)?;
    Ok(aggregate_documents(&documents, expert))
}
