// Internal-external score — in-topic closeness balanced against closeness to
// every other topic.
//
// Loosely based on the community fitness function of Lancichinetti et al.
// (2009). For each topic:
//
//   internal = mean in-topic pair similarity (as in coherence)
//   external = mean similarity between the topic's terms and the
//              concatenated terms of all other topics
//   score    = internal / (internal + external), or 0.0 when both are 0

use super::registry::MeasureId;
use super::traits::ValidationMeasure;
use super::{cross_similarity, ensure_topics, within_similarity, Descriptor};
use crate::embedding::Embedding;
use crate::error::Result;

/// Ratio of internal to internal-plus-external similarity.
pub struct InternalExternalScore<'a> {
    embedding: &'a Embedding,
}

impl<'a> InternalExternalScore<'a> {
    pub fn new(embedding: &'a Embedding) -> Self {
        Self { embedding }
    }

    /// Mean in-topic pair similarity.
    pub fn evaluate_topic_internal(&self, descriptor: &[String]) -> f64 {
        within_similarity(self.embedding, descriptor)
    }

    /// Mean similarity between a descriptor and the terms of other topics.
    pub fn evaluate_topic_external(&self, descriptor: &[String], other_terms: &[String]) -> f64 {
        cross_similarity(self.embedding, descriptor, other_terms)
    }
}

impl ValidationMeasure for InternalExternalScore<'_> {
    fn id(&self) -> MeasureId {
        MeasureId::IntExt
    }

    fn evaluate_topics(&self, descriptors: &[Descriptor]) -> Result<Vec<f64>> {
        ensure_topics(descriptors)?;
        let scores = descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                let internal = self.evaluate_topic_internal(descriptor);
                let other_terms: Vec<String> = descriptors
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != index)
                    .flat_map(|(_, d)| d.iter().cloned())
                    .collect();
                let external = self.evaluate_topic_external(descriptor, &other_terms);
                let denom = internal + external;
                if denom == 0.0 {
                    0.0
                } else {
                    internal / denom
                }
            })
            .collect();
        Ok(scores)
    }
}
