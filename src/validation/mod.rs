// Topic validation measures — embedding-based scores for topic descriptors.
//
// Each measure turns pairwise term similarities (served by the cached
// Embedding provider) into one score per topic and one score per model.
// Pairs touching an out-of-vocabulary term are skipped, and an average over
// zero pairs is 0.0, so degenerate descriptors never produce NaN or an error.

pub mod coherence;
pub mod difference;
pub mod intext;
pub mod minmax;
pub mod registry;
pub mod silhouette;
pub mod traits;

pub use coherence::CoherenceScore;
pub use difference::TopicDifferenceScore;
pub use intext::InternalExternalScore;
pub use minmax::MinMaxScore;
pub use registry::{build_measures, MeasureId};
pub use silhouette::{TermScores, TopicSilhouetteScore};
pub use traits::ValidationMeasure;

use crate::embedding::Embedding;
use crate::error::{Result, ValidationError};

/// One topic descriptor: its top-ranked terms, best first.
pub type Descriptor = Vec<String>;

/// Mean of the values, or 0.0 when there are none.
pub(crate) fn mean_or_zero(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Mean similarity over all unordered term pairs within one descriptor.
pub(crate) fn within_similarity(embedding: &Embedding, descriptor: &[String]) -> f64 {
    mean_or_zero(descriptor.iter().enumerate().flat_map(|(i, term1)| {
        descriptor[i + 1..]
            .iter()
            .filter_map(move |term2| embedding.pair_similarity(term1, term2))
    }))
}

/// Mean similarity over every (term1, term2) pair drawn from two term lists.
pub(crate) fn cross_similarity(
    embedding: &Embedding,
    descriptor1: &[String],
    descriptor2: &[String],
) -> f64 {
    mean_or_zero(descriptor1.iter().flat_map(|term1| {
        descriptor2
            .iter()
            .filter_map(move |term2| embedding.pair_similarity(term1, term2))
    }))
}

/// Spread each unordered topic-pair score onto both topics and average over
/// the K - 1 partners of each topic. A single topic has no partners and
/// scores 0.0.
pub(crate) fn spread_pair_scores(k: usize, pair_score: impl Fn(usize, usize) -> f64) -> Vec<f64> {
    let mut scores = vec![0.0; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let score = pair_score(i, j);
            scores[i] += score;
            scores[j] += score;
        }
    }
    if k > 1 {
        let partners = (k - 1) as f64;
        for score in &mut scores {
            *score /= partners;
        }
    }
    scores
}

/// Mean of a score over all unordered topic pairs.
pub(crate) fn mean_pair_score(k: usize, pair_score: impl Fn(usize, usize) -> f64) -> f64 {
    let pairs = (0..k).flat_map(|i| ((i + 1)..k).map(move |j| (i, j)));
    mean_or_zero(pairs.map(|(i, j)| pair_score(i, j)))
}

/// Reject an empty topic list.
pub(crate) fn ensure_topics(descriptors: &[Descriptor]) -> Result<()> {
    if descriptors.is_empty() {
        return Err(ValidationError::NoTopics);
    }
    Ok(())
}
