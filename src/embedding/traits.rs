// Vector space trait — the seam between the similarity provider and whatever
// actually stores the term vectors.
//
// The default implementation is an in-memory word2vec table (KeyedVectors),
// but tests and alternative backends can plug in their own space without the
// measures or aggregators noticing.

use anyhow::Result;

/// A pretrained term vector space.
pub trait VectorSpace: Send + Sync {
    /// Is this term in the vocabulary?
    fn contains(&self, term: &str) -> bool;

    /// Raw (unclamped) similarity between two terms, or `None` if either
    /// term is missing from the vocabulary.
    fn raw_similarity(&self, term1: &str, term2: &str) -> Option<f64>;

    /// The `n` terms most similar to the combined positive query, best first.
    /// Query terms themselves are never part of the result.
    fn most_similar(&self, positive: &[&str], n: usize) -> Result<Vec<(String, f64)>>;

    /// Number of terms in the vocabulary.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
