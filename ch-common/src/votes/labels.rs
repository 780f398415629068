//! Closed label vocabulary used by annotators
//!
//! Category labels describe what a document is about; sentiment labels are
//! tracked alongside them and never compete with the category decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recognized annotation label
///
/// Variant order is the output order of decisions and of serialized vote maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Irrelevant")]
    Irrelevant,
    #[serde(rename = "Risks")]
    Risks,
    #[serde(rename = "Prevention")]
    Prevention,
    #[serde(rename = "Negative Sentiment")]
    NegativeSentiment,
    #[serde(rename = "Positive Sentiment")]
    PositiveSentiment,
}

/// Whether a label takes part in the category or the sentiment decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Category,
    Sentiment,
}

impl Label {
    /// Every recognized label, in output order
    pub const ALL: [Label; 5] = [
        Label::Irrelevant,
        Label::Risks,
        Label::Prevention,
        Label::NegativeSentiment,
        Label::PositiveSentiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Irrelevant => "Irrelevant",
            Label::Risks => "Risks",
            Label::Prevention => "Prevention",
            Label::NegativeSentiment => "Negative Sentiment",
            Label::PositiveSentiment => "Positive Sentiment",
        }
    }

    pub fn kind(&self) -> LabelKind {
        match self {
            Label::Irrelevant | Label::Risks | Label::Prevention => LabelKind::Category,
            Label::NegativeSentiment | Label::PositiveSentiment => LabelKind::Sentiment,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label string is outside the closed set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}
