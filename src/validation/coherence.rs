// Topic coherence — how semantically close a topic's own terms are.
//
// The topic score is the mean similarity over all unordered pairs of
// descriptor terms. The model score is the mean topic score.

use super::registry::MeasureId;
use super::traits::ValidationMeasure;
use super::{ensure_topics, within_similarity, Descriptor};
use crate::embedding::Embedding;
use crate::error::Result;

/// Mean pairwise in-topic similarity.
pub struct CoherenceScore<'a> {
    embedding: &'a Embedding,
}

impl<'a> CoherenceScore<'a> {
    pub fn new(embedding: &'a Embedding) -> Self {
        Self { embedding }
    }
}

impl ValidationMeasure for CoherenceScore<'_> {
    fn id(&self) -> MeasureId {
        MeasureId::Coherence
    }

    fn evaluate_topic(&self, descriptor: &[String]) -> f64 {
        within_similarity(self.embedding, descriptor)
    }

    fn evaluate_topics(&self, descriptors: &[Descriptor]) -> Result<Vec<f64>> {
        ensure_topics(descriptors)?;
        Ok(descriptors
            .iter()
            .map(|descriptor| self.evaluate_topic(descriptor))
            .collect())
    }
}
