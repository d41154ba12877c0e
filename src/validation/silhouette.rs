// Topic silhouette — Rousseeuw's (1987) silhouette, generalized to topics.
//
// Every descriptor term gets its own silhouette:
//
//   a = mean distance from the term to the other terms of its own topic
//   b = min over other topics of the mean distance from the term to all of
//       that topic's terms
//   s = (b - a) / max(a, b), or 0 when max(a, b) is 0
//
// Only `a` skips the term itself. A term that also appears in another topic
// contributes its zero self-distance to that topic's `b` candidate. With a
// single topic there is no `b`, and every term scores 0.
//
// Topic scores average the term silhouettes; the model score averages the
// topic scores. The per-term values from the latest `evaluate_topics` call
// are kept for term-level reporting.

use std::collections::HashMap;
use std::sync::Mutex;

use super::registry::MeasureId;
use super::traits::ValidationMeasure;
use super::{ensure_topics, mean_or_zero, Descriptor};
use crate::embedding::Embedding;
use crate::error::Result;

/// Term -> silhouette value for one topic.
pub type TermScores = HashMap<String, f64>;

/// Generalized silhouette over descriptor terms.
pub struct TopicSilhouetteScore<'a> {
    embedding: &'a Embedding,
    topic_term_scores: Mutex<Vec<TermScores>>,
}

impl<'a> TopicSilhouetteScore<'a> {
    pub fn new(embedding: &'a Embedding) -> Self {
        Self {
            embedding,
            topic_term_scores: Mutex::new(Vec::new()),
        }
    }

    /// Score every topic and return the per-term silhouettes alongside,
    /// without touching the retained term scores.
    pub fn evaluate_with_terms(
        &self,
        descriptors: &[Descriptor],
    ) -> Result<(Vec<f64>, Vec<TermScores>)> {
        ensure_topics(descriptors)?;

        let mut topic_scores = Vec::with_capacity(descriptors.len());
        let mut all_term_scores = Vec::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            let mut term_scores = TermScores::with_capacity(descriptor.len());
            let mut total = 0.0;

            for term in descriptor {
                let sil = self.term_silhouette(term, index, descriptors);
                total += sil;
                term_scores.insert(term.clone(), sil);
            }

            let topic_score = if descriptor.is_empty() {
                0.0
            } else {
                total / descriptor.len() as f64
            };
            topic_scores.push(topic_score);
            all_term_scores.push(term_scores);
        }

        Ok((topic_scores, all_term_scores))
    }

    /// Per-topic term silhouettes from the most recent `evaluate_topics` call.
    pub fn topic_term_scores(&self) -> Vec<TermScores> {
        self.retained().clone()
    }

    /// Mean distance from a term to a descriptor's terms, optionally skipping
    /// the term itself.
    pub fn evaluate_term_topic_distance(
        &self,
        term: &str,
        descriptor: &[String],
        ignore_self: bool,
    ) -> f64 {
        mean_or_zero(
            descriptor
                .iter()
                .filter(|other| !(ignore_self && other.as_str() == term))
                .filter_map(|other| self.embedding.pair_distance(term, other)),
        )
    }

    fn term_silhouette(&self, term: &str, own_index: usize, descriptors: &[Descriptor]) -> f64 {
        let a = self.evaluate_term_topic_distance(term, &descriptors[own_index], true);
        let b = descriptors
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != own_index)
            .map(|(_, other)| self.evaluate_term_topic_distance(term, other, false))
            .reduce(f64::min);

        let Some(b) = b else {
            return 0.0;
        };
        let denom = a.max(b);
        if denom == 0.0 {
            0.0
        } else {
            (b - a) / denom
        }
    }

    fn retained(&self) -> std::sync::MutexGuard<'_, Vec<TermScores>> {
        self.topic_term_scores
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ValidationMeasure for TopicSilhouetteScore<'_> {
    fn id(&self) -> MeasureId {
        MeasureId::Silhouette
    }

    fn evaluate_topics(&self, descriptors: &[Descriptor]) -> Result<Vec<f64>> {
        let (topic_scores, term_scores) = self.evaluate_with_terms(descriptors)?;
        *self.retained() = term_scores;
        Ok(topic_scores)
    }
}
