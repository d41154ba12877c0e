// Error taxonomy for the validation core.
//
// Only caller contract violations live here. Unavailable resources (an
// embedding that failed to load, a model without term rankings) are not
// errors: the aggregators turn them into empty results. Degenerate
// computations (no valid term pairs) score 0.0 and never surface at all.

use thiserror::Error;

/// Errors returned by the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A measure identifier that doesn't name one of the registered measures.
    #[error("unknown validation measure: {0}")]
    UnknownMeasure(String),

    /// A validation table was requested without any measures.
    #[error("no validation measures requested")]
    NoMeasures,

    /// A topic model with no descriptors was passed for scoring.
    #[error("topic model has no descriptors to evaluate")]
    NoTopics,

    /// A similarity was requested for a term missing from the embedding.
    #[error("term not in embedding vocabulary: {0}")]
    OutOfVocabulary(String),

    /// A metadata record is missing a mandatory field or has the wrong type.
    #[error("invalid metadata for {id}: {reason}")]
    InvalidMetadata { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
