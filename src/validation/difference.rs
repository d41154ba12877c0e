// Topic difference — how far apart the topics sit in the embedding space.
//
// The distance between two topics is 1 minus the mean similarity over every
// cross pair of their terms. Each topic scores the mean distance to the other
// K - 1 topics; the model scores the mean distance over all unordered topic
// pairs.

use super::registry::MeasureId;
use super::traits::ValidationMeasure;
use super::{cross_similarity, ensure_topics, mean_pair_score, spread_pair_scores, Descriptor};
use crate::embedding::Embedding;
use crate::error::Result;

/// Mean inter-topic distance.
pub struct TopicDifferenceScore<'a> {
    embedding: &'a Embedding,
}

impl<'a> TopicDifferenceScore<'a> {
    pub fn new(embedding: &'a Embedding) -> Self {
        Self { embedding }
    }

    /// Mean similarity over all cross pairs of terms from the two descriptors.
    pub fn evaluate_similarity(&self, descriptor1: &[String], descriptor2: &[String]) -> f64 {
        cross_similarity(self.embedding, descriptor1, descriptor2)
    }

    /// Distance between two descriptors: `1 - evaluate_similarity`.
    pub fn evaluate_distance(&self, descriptor1: &[String], descriptor2: &[String]) -> f64 {
        1.0 - self.evaluate_similarity(descriptor1, descriptor2)
    }
}

impl ValidationMeasure for TopicDifferenceScore<'_> {
    fn id(&self) -> MeasureId {
        MeasureId::Difference
    }

    fn evaluate_topics(&self, descriptors: &[Descriptor]) -> Result<Vec<f64>> {
        ensure_topics(descriptors)?;
        Ok(spread_pair_scores(descriptors.len(), |i, j| {
            self.evaluate_distance(&descriptors[i], &descriptors[j])
        }))
    }

    fn evaluate_model(&self, descriptors: &[Descriptor]) -> Result<f64> {
        ensure_topics(descriptors)?;
        Ok(mean_pair_score(descriptors.len(), |i, j| {
            self.evaluate_distance(&descriptors[i], &descriptors[j])
        }))
    }
}
