// Row types for validation tables.
//
// These are the shapes presentation code consumes: terminal tables here,
// JSON for anything else. One row per topic, topic pair, term pair, or model.

use serde::Serialize;

use crate::validation::MeasureId;

/// One measure's score within a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasureScore {
    pub measure: MeasureId,
    pub score: f64,
}

/// Look up a measure's score in a row's score list.
fn find_score(scores: &[MeasureScore], measure: MeasureId) -> Option<f64> {
    scores
        .iter()
        .find(|s| s.measure == measure)
        .map(|s| s.score)
}

/// Scores for one topic of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRow {
    /// Zero-padded topic number ("01")
    pub topic: String,
    /// Comma-separated descriptor terms
    pub descriptor: String,
    /// One rounded score per requested measure, in request order
    pub scores: Vec<MeasureScore>,
}

impl ValidationRow {
    pub fn score(&self, measure: MeasureId) -> Option<f64> {
        find_score(&self.scores, measure)
    }
}

/// Similarity between two topics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPairRow {
    pub topic1: String,
    pub topic2: String,
    pub similarity: f64,
}

/// Similarity between two descriptor terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermPairRow {
    pub term1: String,
    pub term2: String,
    pub similarity: f64,
    /// Do the two terms share at least one descriptor?
    pub intra: bool,
}

/// Silhouette score for one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSilhouetteRow {
    /// "Topic 01"
    pub label: String,
    pub descriptor: String,
    /// 1-based topic number
    pub number: usize,
    pub score: f64,
}

/// Silhouette score for one term of one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermSilhouetteRow {
    pub term: String,
    pub score: f64,
}

/// Model-level scores for one topic model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelValidationRow {
    pub name: String,
    pub corpus: String,
    pub topics: usize,
    pub scores: Vec<MeasureScore>,
}

impl ModelValidationRow {
    pub fn score(&self, measure: MeasureId) -> Option<f64> {
        find_score(&self.scores, measure)
    }
}
