// Cached similarity provider over a word embedding.
//
// Every validation measure asks for the similarity between the same handful
// of descriptor terms over and over: coherence looks at in-topic pairs, the
// difference and silhouette measures at cross-topic pairs, and a validation
// table runs all five. The provider memoizes each unordered term pair the
// first time it is seen, so repeated evaluation costs one hash lookup.
//
// Similarities are clamped to [0, 1]: negative cosine values are treated as
// "unrelated" rather than "opposite", which keeps every derived score
// (distances, ratios, silhouettes) inside its documented range.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use super::traits::VectorSpace;
use crate::error::{Result, ValidationError};

/// Canonical cache key for an unordered term pair: the two terms in
/// lexicographic order, so (a, b) and (b, a) share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TermPair(String, String);

impl TermPair {
    fn new(term1: &str, term2: &str) -> Self {
        if term1 <= term2 {
            Self(term1.to_string(), term2.to_string())
        } else {
            Self(term2.to_string(), term1.to_string())
        }
    }
}

/// A neighbor query: one term, or several terms combined into a single
/// positive centroid.
#[derive(Debug, Clone, Copy)]
pub enum NeighborQuery<'q> {
    Term(&'q str),
    Terms(&'q [String]),
}

impl<'q> From<&'q str> for NeighborQuery<'q> {
    fn from(term: &'q str) -> Self {
        NeighborQuery::Term(term)
    }
}

impl<'q> From<&'q String> for NeighborQuery<'q> {
    fn from(term: &'q String) -> Self {
        NeighborQuery::Term(term.as_str())
    }
}

impl<'q> From<&'q [String]> for NeighborQuery<'q> {
    fn from(terms: &'q [String]) -> Self {
        NeighborQuery::Terms(terms)
    }
}

impl<'q> From<&'q Vec<String>> for NeighborQuery<'q> {
    fn from(terms: &'q Vec<String>) -> Self {
        NeighborQuery::Terms(terms.as_slice())
    }
}

/// A loaded word embedding plus its pairwise similarity cache.
///
/// Loaded once per embedding identifier and shared read-only by every
/// measure that evaluates against it (the registry hands out `Arc<Embedding>`).
/// The cache is scoped to this instance, so two embeddings never share
/// entries.
pub struct Embedding {
    id: String,
    space: Box<dyn VectorSpace>,
    similarity_cache: Mutex<HashMap<TermPair, f64>>,
}

impl Embedding {
    /// Wrap a vector space under the given identifier.
    pub fn new(id: impl Into<String>, space: impl VectorSpace + 'static) -> Self {
        Self {
            id: id.into(),
            space: Box::new(space),
            similarity_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Vocabulary membership test.
    pub fn contains(&self, term: &str) -> bool {
        self.space.contains(term)
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.space.len()
    }

    pub fn is_empty(&self) -> bool {
        self.space.is_empty()
    }

    /// Clamped similarity between two terms, in [0, 1].
    ///
    /// Symmetric and memoized: the first call for an unordered pair queries the
    /// vector space, later calls in either order are served from the cache.
    /// Returns `OutOfVocabulary` if either term is missing; measures filter
    /// with [`Embedding::pair_similarity`] instead of handling that error.
    pub fn similarity(&self, term1: &str, term2: &str) -> Result<f64> {
        let key = TermPair::new(term1, term2);
        if let Some(&cached) = self.cache().get(&key) {
            return Ok(cached);
        }

        // Lock is released while the vector space computes. Two threads
        // racing on the same pair both compute the identical value.
        let raw = match self.space.raw_similarity(term1, term2) {
            Some(raw) => raw,
            None => {
                let missing = if self.contains(term1) { term2 } else { term1 };
                return Err(ValidationError::OutOfVocabulary(missing.to_string()));
            }
        };

        let sim = raw.clamp(0.0, 1.0);
        self.cache().entry(key).or_insert(sim);
        Ok(sim)
    }

    /// Similarity for a pair only if both terms are in the vocabulary.
    pub fn pair_similarity(&self, term1: &str, term2: &str) -> Option<f64> {
        if !self.contains(term1) || !self.contains(term2) {
            return None;
        }
        self.similarity(term1, term2).ok()
    }

    /// Distance between two terms: `1 - similarity`.
    pub fn distance(&self, term1: &str, term2: &str) -> Result<f64> {
        Ok(1.0 - self.similarity(term1, term2)?)
    }

    /// Distance for a pair only if both terms are in the vocabulary.
    pub fn pair_distance(&self, term1: &str, term2: &str) -> Option<f64> {
        self.pair_similarity(term1, term2).map(|sim| 1.0 - sim)
    }

    /// Nearest neighbors of a term, or of the centroid of several terms.
    ///
    /// Out-of-vocabulary query terms are dropped first; if none remain, or the
    /// vector space lookup fails, the result is empty.
    pub fn neighbors<'q>(&self, query: impl Into<NeighborQuery<'q>>, n: usize) -> Vec<String> {
        let valid: Vec<&str> = match query.into() {
            NeighborQuery::Term(term) => vec![term],
            NeighborQuery::Terms(terms) => terms.iter().map(String::as_str).collect(),
        }
        .into_iter()
        .filter(|term| self.contains(term))
        .collect();

        if valid.is_empty() {
            return Vec::new();
        }

        match self.space.most_similar(&valid, n) {
            Ok(similar) => similar.into_iter().map(|(term, _)| term).collect(),
            Err(e) => {
                warn!(embedding = %self.id, error = %e, "Neighbor lookup failed");
                Vec::new()
            }
        }
    }

    /// Number of term pairs memoized so far.
    pub fn cached_pairs(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<TermPair, f64>> {
        // Entries are written once with a deterministic value, so a poisoned
        // lock still guards a consistent map.
        self.similarity_cache.lock().unwrap_or_else(|poisoned| {
            debug!(embedding = %self.id, "Recovering poisoned similarity cache lock");
            poisoned.into_inner()
        })
    }
}

impl std::fmt::Debug for Embedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedding")
            .field("id", &self.id)
            .field("terms", &self.len())
            .field("cached_pairs", &self.cached_pairs())
            .finish()
    }
}
