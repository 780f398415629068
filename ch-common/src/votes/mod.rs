//! Majority-vote aggregation of crowd annotations
//!
//! Pipeline: raw [`AnnotationRecord`]s → [`group_ballots`] → [`decide`] per
//! document → [`export::render`]. Every pass builds its own state and returns
//! its own counters.

pub mod ballot;
pub mod export;
pub mod labels;
pub mod policy;
pub mod record;

pub use ballot::{group_ballots, DocumentBallots, VoterBallot};
pub use export::{ExportFormat, INSTRUCTIONS};
pub use labels::{Label, LabelKind};
pub use policy::{
    aggregate, aggregate_documents, decide, Aggregation, DocumentDecision, DocumentTally, Verdict,
    MAJORITY, QUORUM,
};
pub use record::{AnnotationRecord, DocumentMetadata};
