// Topic model view — metadata plus the ranked term lists that descriptors
// are cut from.
//
// Term rankings come from upstream (the factorization step). A model whose
// rankings couldn't be loaded still carries its metadata, but its descriptors
// are unavailable, and the aggregators leave it out of their results.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::meta::TopicModelMeta;
use crate::embedding::Embedding;
use crate::validation::Descriptor;

/// Default descriptor length.
pub const DEFAULT_TOP_TERMS: usize = 10;
/// Default length of the extended descriptor shown alongside the short one.
pub const DEFAULT_EXTENDED_TOP_TERMS: usize = 20;

/// A topic model: metadata and (if available) full term rankings.
#[derive(Debug, Clone)]
pub struct TopicModel {
    pub meta: TopicModelMeta,
    term_rankings: Option<Vec<Vec<String>>>,
    top_terms: usize,
    extended_top_terms: usize,
}

/// One row of the descriptor listing: the short descriptor and the terms
/// that follow it in the extended ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptorRow {
    pub topic: String,
    pub descriptor: String,
    pub extended: String,
}

impl TopicModel {
    pub fn new(meta: TopicModelMeta, term_rankings: Option<Vec<Vec<String>>>) -> Self {
        Self {
            meta,
            term_rankings,
            top_terms: DEFAULT_TOP_TERMS,
            extended_top_terms: DEFAULT_EXTENDED_TOP_TERMS,
        }
    }

    /// Override the descriptor lengths.
    pub fn with_top_terms(mut self, top_terms: usize, extended_top_terms: usize) -> Self {
        self.top_terms = top_terms;
        self.extended_top_terms = extended_top_terms;
        self
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn top_terms(&self) -> usize {
        self.top_terms
    }

    /// Are the term rankings loaded?
    pub fn has_rankings(&self) -> bool {
        self.term_rankings.is_some()
    }

    /// Descriptors truncated to `top` terms (0 means the configured default).
    /// `None` when the term rankings are unavailable.
    pub fn descriptors(&self, top: usize) -> Option<Vec<Descriptor>> {
        let top = if top < 1 { self.top_terms } else { top };
        self.term_rankings
            .as_ref()
            .map(|rankings| truncate_term_rankings(rankings, top, None))
    }

    /// Descriptors of the configured default length.
    pub fn default_descriptors(&self) -> Option<Vec<Descriptor>> {
        self.descriptors(self.top_terms)
    }

    /// Default-length descriptors filled only with terms the embedding knows.
    pub fn in_vocabulary_descriptors(&self, embedding: &Embedding) -> Option<Vec<Descriptor>> {
        self.term_rankings
            .as_ref()
            .map(|rankings| truncate_term_rankings(rankings, self.top_terms, Some(embedding)))
    }

    /// Sorted unique terms across all default-length descriptors.
    pub fn all_descriptor_terms(&self) -> Vec<String> {
        self.default_descriptors()
            .map(|descriptors| all_descriptor_terms(&descriptors))
            .unwrap_or_default()
    }

    /// Term -> indices of the descriptors it appears in.
    pub fn term_map(&self) -> HashMap<String, Vec<usize>> {
        self.default_descriptors()
            .map(|descriptors| term_map(&descriptors))
            .unwrap_or_default()
    }

    /// Term -> number of descriptors it appears in.
    pub fn descriptor_term_counts(&self) -> HashMap<String, usize> {
        self.term_map()
            .into_iter()
            .map(|(term, topics)| (term, topics.len()))
            .collect()
    }

    /// Short descriptor plus the rest of the extended ranking, per topic.
    pub fn extended_descriptor_rows(&self) -> Option<Vec<DescriptorRow>> {
        let descriptors = self.descriptors(self.extended_top_terms)?;
        let k = descriptors.len();
        Some(
            descriptors
                .iter()
                .enumerate()
                .map(|(i, ranking)| {
                    let split = self.top_terms.min(ranking.len());
                    DescriptorRow {
                        topic: crate::report::topic_number(i, k),
                        descriptor: ranking[..split].join(", "),
                        extended: ranking[split..].join(", "),
                    }
                })
                .collect(),
        )
    }
}

/// Truncate each ranking to `top` terms. With a vocabulary, out-of-vocabulary
/// terms are skipped while filling the `top` slots, so descriptors may come
/// out shorter than `top`. A `top` of 0 keeps whole rankings.
pub fn truncate_term_rankings(
    rankings: &[Vec<String>],
    top: usize,
    vocab: Option<&Embedding>,
) -> Vec<Descriptor> {
    let limit = if top < 1 { usize::MAX } else { top };
    rankings
        .iter()
        .map(|ranking| {
            ranking
                .iter()
                .filter(|term| vocab.map_or(true, |embedding| embedding.contains(term)))
                .take(limit)
                .cloned()
                .collect()
        })
        .collect()
}

/// Sorted unique terms across the descriptors.
pub fn all_descriptor_terms(descriptors: &[Descriptor]) -> Vec<String> {
    descriptors
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Term -> indices of the descriptors containing it, in topic order.
pub fn term_map(descriptors: &[Descriptor]) -> HashMap<String, Vec<usize>> {
    let mut map: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, descriptor) in descriptors.iter().enumerate() {
        for term in descriptor {
            let topics = map.entry(term.clone()).or_default();
            if topics.last() != Some(&i) {
                topics.push(i);
            }
        }
    }
    map
}
