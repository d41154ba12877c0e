// Topic-level reporting for a single topic model.
//
// Every method takes the model's descriptors and the embedding as options.
// If either is unavailable the result is empty (or `None` for matrices); an
// empty descriptor list or an empty measure list is a caller error.

use serde::Serialize;
use tracing::debug;

use super::tables::{
    MeasureScore, TermPairRow, TermSilhouetteRow, TopicPairRow, TopicSilhouetteRow,
    ValidationRow,
};
use super::{round_to, topic_label, topic_number};
use crate::config::DEFAULT_PRECISION;
use crate::embedding::Embedding;
use crate::error::{Result, ValidationError};
use crate::topics::model::{all_descriptor_terms, term_map};
use crate::validation::{
    build_measures, Descriptor, MeasureId, TermScores, TopicDifferenceScore, TopicSilhouetteScore,
};

/// A square matrix with a label per row/column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Generates validation tables for the topics of one model.
#[derive(Debug, Clone)]
pub struct TopicValidator {
    precision: u32,
}

impl Default for TopicValidator {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

/// Both inputs, if both are available. An empty topic list is an error.
fn available<'d, 'e>(
    descriptors: Option<&'d [Descriptor]>,
    embedding: Option<&'e Embedding>,
) -> Result<Option<(&'d [Descriptor], &'e Embedding)>> {
    let Some(embedding) = embedding else {
        debug!("No embedding available, returning empty result");
        return Ok(None);
    };
    let Some(descriptors) = descriptors else {
        debug!(embedding = embedding.id(), "No descriptors available, returning empty result");
        return Ok(None);
    };
    if descriptors.is_empty() {
        return Err(ValidationError::NoTopics);
    }
    Ok(Some((descriptors, embedding)))
}

impl TopicValidator {
    /// Create a validator that rounds table scores to `precision` decimals.
    pub fn new(precision: u32) -> Self {
        Self { precision }
    }

    /// One row per topic with a rounded score for each requested measure.
    pub fn validation_table(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
        measures: &[MeasureId],
    ) -> Result<Vec<ValidationRow>> {
        let Some((descriptors, embedding)) = available(descriptors, embedding)? else {
            return Ok(Vec::new());
        };
        if measures.is_empty() {
            return Err(ValidationError::NoMeasures);
        }

        let k = descriptors.len();
        let mut rows: Vec<ValidationRow> = descriptors
            .iter()
            .enumerate()
            .map(|(i, descriptor)| ValidationRow {
                topic: topic_number(i, k),
                descriptor: descriptor.join(", "),
                scores: Vec::with_capacity(measures.len()),
            })
            .collect();

        for measure in build_measures(measures, embedding) {
            let scores = measure.evaluate_topics(descriptors)?;
            for (row, score) in rows.iter_mut().zip(scores) {
                row.scores.push(MeasureScore {
                    measure: measure.id(),
                    score: round_to(score, self.precision),
                });
            }
        }

        debug!(embedding = embedding.id(), topics = k, "Built validation table");
        Ok(rows)
    }

    /// K x K topic distance matrix (1 - mean cross-term similarity), with the
    /// diagonal populated.
    pub fn topic_distance_matrix(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
    ) -> Result<Option<LabeledMatrix>> {
        let Some((descriptors, embedding)) = available(descriptors, embedding)? else {
            return Ok(None);
        };

        let measure = TopicDifferenceScore::new(embedding);
        let k = descriptors.len();
        let mut values = vec![vec![0.0; k]; k];
        for i in 0..k {
            for j in i..k {
                let dist = measure.evaluate_distance(&descriptors[i], &descriptors[j]);
                values[i][j] = dist;
                values[j][i] = dist;
            }
        }

        Ok(Some(LabeledMatrix {
            labels: (0..k).map(|i| topic_label(i, k)).collect(),
            values,
        }))
    }

    /// K x K topic similarity matrix: 1 - the distance matrix.
    pub fn topic_similarity_matrix(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
    ) -> Result<Option<LabeledMatrix>> {
        Ok(self
            .topic_distance_matrix(descriptors, embedding)?
            .map(|mut matrix| {
                for row in &mut matrix.values {
                    for value in row.iter_mut() {
                        *value = 1.0 - *value;
                    }
                }
                matrix
            }))
    }

    /// Pairwise topic similarities, one row per pair.
    ///
    /// With `unique_only` each unordered pair of distinct topics appears once
    /// (K(K-1)/2 rows). Otherwise every ordered pair appears, self pairs
    /// included (K^2 rows).
    pub fn topic_pair_table(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
        unique_only: bool,
    ) -> Result<Vec<TopicPairRow>> {
        let Some(matrix) = self.topic_similarity_matrix(descriptors, embedding)? else {
            return Ok(Vec::new());
        };

        let k = matrix.labels.len();
        let mut rows = Vec::with_capacity(if unique_only { k * (k - 1) / 2 } else { k * k });
        for i in 0..k {
            for j in i..k {
                if i == j && unique_only {
                    continue;
                }
                let similarity = matrix.values[i][j];
                rows.push(TopicPairRow {
                    topic1: matrix.labels[i].clone(),
                    topic2: matrix.labels[j].clone(),
                    similarity,
                });
                if i != j && !unique_only {
                    rows.push(TopicPairRow {
                        topic1: matrix.labels[j].clone(),
                        topic2: matrix.labels[i].clone(),
                        similarity,
                    });
                }
            }
        }
        Ok(rows)
    }

    /// Sorted in-vocabulary descriptor terms and their pairwise similarities.
    /// The diagonal is left at 0.0; callers decide what a self pair means.
    fn term_similarities(
        descriptors: &[Descriptor],
        embedding: &Embedding,
    ) -> (Vec<String>, Vec<Vec<f64>>) {
        let terms: Vec<String> = all_descriptor_terms(descriptors)
            .into_iter()
            .filter(|term| embedding.contains(term))
            .collect();

        let m = terms.len();
        let mut sims = vec![vec![0.0; m]; m];
        for i in 0..m {
            for j in (i + 1)..m {
                let sim = embedding.pair_similarity(&terms[i], &terms[j]).unwrap_or(0.0);
                sims[i][j] = sim;
                sims[j][i] = sim;
            }
        }
        (terms, sims)
    }

    /// Pairwise distances between all in-vocabulary descriptor terms.
    pub fn term_distance_matrix(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
    ) -> Result<Option<LabeledMatrix>> {
        let Some((descriptors, embedding)) = available(descriptors, embedding)? else {
            return Ok(None);
        };

        let (terms, sims) = Self::term_similarities(descriptors, embedding);
        let values = sims
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, sim)| if i == j { 0.0 } else { 1.0 - sim })
                    .collect()
            })
            .collect();

        Ok(Some(LabeledMatrix {
            labels: terms,
            values,
        }))
    }

    /// Pairwise term similarities over the union of in-vocabulary descriptor
    /// terms, each tagged `intra` when the two terms share a descriptor.
    ///
    /// Without `unique_only`, self pairs are included at exactly 1.0 and both
    /// orderings of every other pair appear (m^2 rows). With it, self pairs
    /// are dropped and each unordered pair appears once (m(m-1)/2 rows).
    pub fn term_pair_table(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
        unique_only: bool,
    ) -> Result<Vec<TermPairRow>> {
        let Some((descriptors, embedding)) = available(descriptors, embedding)? else {
            return Ok(Vec::new());
        };

        let (terms, sims) = Self::term_similarities(descriptors, embedding);
        let assignments = term_map(descriptors);
        let shares_topic = |a: &str, b: &str| match (assignments.get(a), assignments.get(b)) {
            (Some(topics_a), Some(topics_b)) => topics_a.iter().any(|t| topics_b.contains(t)),
            _ => false,
        };

        let m = terms.len();
        let mut rows = Vec::with_capacity(if unique_only { m * m.saturating_sub(1) / 2 } else { m * m });
        for i in 0..m {
            for j in i..m {
                let similarity = if i == j {
                    if unique_only {
                        continue;
                    }
                    1.0
                } else {
                    sims[i][j].max(0.0)
                };
                let intra = shares_topic(&terms[i], &terms[j]);
                rows.push(TermPairRow {
                    term1: terms[i].clone(),
                    term2: terms[j].clone(),
                    similarity,
                    intra,
                });
                if i != j && !unique_only {
                    rows.push(TermPairRow {
                        term1: terms[j].clone(),
                        term2: terms[i].clone(),
                        similarity,
                        intra,
                    });
                }
            }
        }
        Ok(rows)
    }

    /// Silhouette score per topic.
    pub fn topic_silhouette_table(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
    ) -> Result<Vec<TopicSilhouetteRow>> {
        let Some((descriptors, embedding)) = available(descriptors, embedding)? else {
            return Ok(Vec::new());
        };

        let measure = TopicSilhouetteScore::new(embedding);
        let (scores, _) = measure.evaluate_with_terms(descriptors)?;
        let k = descriptors.len();
        Ok(descriptors
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(i, (descriptor, score))| TopicSilhouetteRow {
                label: topic_label(i, k),
                descriptor: descriptor.join(", "),
                number: i + 1,
                score,
            })
            .collect())
    }

    /// Per-topic term silhouette maps.
    pub fn term_silhouette_scores(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
    ) -> Result<Vec<TermScores>> {
        let Some((descriptors, embedding)) = available(descriptors, embedding)? else {
            return Ok(Vec::new());
        };

        let measure = TopicSilhouetteScore::new(embedding);
        let (_, term_scores) = measure.evaluate_with_terms(descriptors)?;
        Ok(term_scores)
    }

    /// Per-topic term silhouettes as rows, in descriptor order.
    pub fn term_silhouette_table(
        &self,
        descriptors: Option<&[Descriptor]>,
        embedding: Option<&Embedding>,
    ) -> Result<Vec<Vec<TermSilhouetteRow>>> {
        let term_scores = self.term_silhouette_scores(descriptors, embedding)?;
        let Some(descriptors) = descriptors else {
            return Ok(Vec::new());
        };

        Ok(descriptors
            .iter()
            .zip(term_scores)
            .map(|(descriptor, scores)| {
                let mut seen = std::collections::HashSet::new();
                descriptor
                    .iter()
                    .filter(|term| seen.insert(term.as_str()))
                    .map(|term| TermSilhouetteRow {
                        term: term.clone(),
                        score: scores.get(term).copied().unwrap_or(0.0),
                    })
                    .collect()
            })
            .collect())
    }
}
