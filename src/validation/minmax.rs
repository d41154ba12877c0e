// Min-max score — topic distinctiveness normalized by topic self-similarity.
//
// Loosely based on the min-max cluster similarity measure of Ding et al.
// (2001). The raw similarity between two topics is the mean cross-pair term
// similarity; it is normalized by the product of each topic's raw
// self-similarity:
//
//   raw(i, j) / (raw(i, i) * raw(j, j))
//
// The denominator is a plain product, not a geometric mean. Lower scores
// mean more distinct topics, so this is the one measure to minimize.

use super::registry::MeasureId;
use super::traits::ValidationMeasure;
use super::{cross_similarity, ensure_topics, mean_pair_score, spread_pair_scores, Descriptor};
use crate::embedding::Embedding;
use crate::error::Result;

/// Normalized inter-topic similarity (lower is better).
pub struct MinMaxScore<'a> {
    embedding: &'a Embedding,
}

impl<'a> MinMaxScore<'a> {
    pub fn new(embedding: &'a Embedding) -> Self {
        Self { embedding }
    }

    /// Raw (non-normalized) similarity between two descriptors.
    pub fn evaluate_raw_similarity(&self, descriptor1: &[String], descriptor2: &[String]) -> f64 {
        cross_similarity(self.embedding, descriptor1, descriptor2)
    }

    /// Normalized similarity between two descriptors; 0.0 when either
    /// self-similarity is 0.
    pub fn evaluate_similarity(&self, descriptor1: &[String], descriptor2: &[String]) -> f64 {
        let self1 = self.evaluate_raw_similarity(descriptor1, descriptor1);
        let self2 = self.evaluate_raw_similarity(descriptor2, descriptor2);
        normalize(self.evaluate_raw_similarity(descriptor1, descriptor2), self1 * self2)
    }

    fn self_similarities(&self, descriptors: &[Descriptor]) -> Vec<f64> {
        descriptors
            .iter()
            .map(|d| self.evaluate_raw_similarity(d, d))
            .collect()
    }
}

fn normalize(numer: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        numer / denom
    }
}

impl ValidationMeasure for MinMaxScore<'_> {
    fn id(&self) -> MeasureId {
        MeasureId::MinMax
    }

    fn is_maximize(&self) -> bool {
        false
    }

    fn evaluate_topics(&self, descriptors: &[Descriptor]) -> Result<Vec<f64>> {
        ensure_topics(descriptors)?;
        let selfs = self.self_similarities(descriptors);
        Ok(spread_pair_scores(descriptors.len(), |i, j| {
            let raw = self.evaluate_raw_similarity(&descriptors[i], &descriptors[j]);
            normalize(raw, selfs[i] * selfs[j])
        }))
    }

    fn evaluate_model(&self, descriptors: &[Descriptor]) -> Result<f64> {
        ensure_topics(descriptors)?;
        let selfs = self.self_similarities(descriptors);
        Ok(mean_pair_score(descriptors.len(), |i, j| {
            let raw = self.evaluate_raw_similarity(&descriptors[i], &descriptors[j]);
            normalize(raw, selfs[i] * selfs[j])
        }))
    }
}
