// Measure registry — identifiers, display names, and construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::coherence::CoherenceScore;
use super::difference::TopicDifferenceScore;
use super::intext::InternalExternalScore;
use super::minmax::MinMaxScore;
use super::silhouette::TopicSilhouetteScore;
use super::traits::ValidationMeasure;
use crate::embedding::Embedding;
use crate::error::ValidationError;

/// Identifier for one of the registered validation measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureId {
    Coherence,
    Difference,
    MinMax,
    IntExt,
    Silhouette,
}

impl MeasureId {
    /// Every registered measure, in table column order.
    pub const ALL: [MeasureId; 5] = [
        MeasureId::Coherence,
        MeasureId::Difference,
        MeasureId::MinMax,
        MeasureId::IntExt,
        MeasureId::Silhouette,
    ];

    /// Stable identifier used in configuration and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            MeasureId::Coherence => "coherence",
            MeasureId::Difference => "difference",
            MeasureId::MinMax => "minmax",
            MeasureId::IntExt => "intext",
            MeasureId::Silhouette => "silhouette",
        }
    }

    /// Full display name.
    pub fn name(self) -> &'static str {
        match self {
            MeasureId::Coherence => "Topic Coherence Score",
            MeasureId::Difference => "Topic Difference Score",
            MeasureId::MinMax => "Min-Max Score",
            MeasureId::IntExt => "Internal-External Score",
            MeasureId::Silhouette => "Topic Silhouette Score",
        }
    }

    /// Column header name.
    pub fn short_name(self) -> &'static str {
        match self {
            MeasureId::Coherence => "Coherence",
            MeasureId::Difference => "Difference",
            MeasureId::MinMax => "Min-Max",
            MeasureId::IntExt => "Int-Ext",
            MeasureId::Silhouette => "Silhouette",
        }
    }

    /// Is a higher score better? Matches the built measure's `is_maximize`.
    pub fn is_maximize(self) -> bool {
        !matches!(self, MeasureId::MinMax)
    }

    /// Construct the measure against an embedding.
    pub fn build<'a>(self, embedding: &'a Embedding) -> Box<dyn ValidationMeasure + 'a> {
        match self {
            MeasureId::Coherence => Box::new(CoherenceScore::new(embedding)),
            MeasureId::Difference => Box::new(TopicDifferenceScore::new(embedding)),
            MeasureId::MinMax => Box::new(MinMaxScore::new(embedding)),
            MeasureId::IntExt => Box::new(InternalExternalScore::new(embedding)),
            MeasureId::Silhouette => Box::new(TopicSilhouetteScore::new(embedding)),
        }
    }

    /// Parse a list of measure identifiers, failing on the first unknown one.
    pub fn parse_list<S: AsRef<str>>(ids: &[S]) -> Result<Vec<MeasureId>, ValidationError> {
        ids.iter().map(|id| id.as_ref().parse()).collect()
    }
}

/// Build every measure in `ids` against the same embedding.
pub fn build_measures<'a>(
    ids: &[MeasureId],
    embedding: &'a Embedding,
) -> Vec<Box<dyn ValidationMeasure + 'a>> {
    ids.iter().map(|id| id.build(embedding)).collect()
}

impl FromStr for MeasureId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MeasureId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownMeasure(s.to_string()))
    }
}

impl fmt::Display for MeasureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
