// In-memory keyed term vectors — the default VectorSpace.
//
// Mirrors what a word2vec "KeyedVectors" table offers: a vocabulary index,
// one dense vector per term, cosine similarity between terms, and
// most-similar queries against the normalized centroid of a set of terms.
// Norms are computed once on insert so each similarity is a single dot product.
// Arithmetic is done in f64; only exact zero vectors are treated as degenerate.

use std::collections::HashMap;

use anyhow::Result;

use super::traits::VectorSpace;

/// Dense term vectors keyed by term.
#[derive(Debug, Clone, Default)]
pub struct KeyedVectors {
    dimensions: usize,
    index: HashMap<String, usize>,
    terms: Vec<String>,
    vectors: Vec<Vec<f32>>,
    norms: Vec<f64>,
}

impl KeyedVectors {
    /// Create an empty table for vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            ..Default::default()
        }
    }

    /// Create an empty table with room for `capacity` terms.
    pub fn with_capacity(dimensions: usize, capacity: usize) -> Self {
        Self {
            dimensions,
            index: HashMap::with_capacity(capacity),
            terms: Vec::with_capacity(capacity),
            vectors: Vec::with_capacity(capacity),
            norms: Vec::with_capacity(capacity),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Add a term vector. Re-inserting a term replaces its vector.
    pub fn insert(&mut self, term: impl Into<String>, vector: Vec<f32>) -> Result<()> {
        let term = term.into();
        if vector.len() != self.dimensions {
            anyhow::bail!(
                "Vector for '{}' has {} dimensions, expected {}",
                term,
                vector.len(),
                self.dimensions
            );
        }

        let norm = vector
            .iter()
            .map(|&x| f64::from(x) * f64::from(x))
            .sum::<f64>()
            .sqrt();
        match self.index.get(&term) {
            Some(&slot) => {
                self.vectors[slot] = vector;
                self.norms[slot] = norm;
            }
            None => {
                self.index.insert(term.clone(), self.terms.len());
                self.terms.push(term);
                self.vectors.push(vector);
                self.norms.push(norm);
            }
        }
        Ok(())
    }

    /// The stored vector for a term.
    pub fn vector(&self, term: &str) -> Option<&[f32]> {
        self.index.get(term).map(|&slot| self.vectors[slot].as_slice())
    }

    /// Vocabulary in insertion order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    fn cosine(&self, slot1: usize, slot2: usize) -> f64 {
        let (norm1, norm2) = (self.norms[slot1], self.norms[slot2]);
        if norm1 == 0.0 || norm2 == 0.0 {
            return 0.0;
        }
        let product = dot(&self.vectors[slot1], &self.vectors[slot2]);
        (product / norm1 / norm2).clamp(-1.0, 1.0)
    }
}

impl VectorSpace for KeyedVectors {
    fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    fn raw_similarity(&self, term1: &str, term2: &str) -> Option<f64> {
        let slot1 = *self.index.get(term1)?;
        let slot2 = *self.index.get(term2)?;
        Some(self.cosine(slot1, slot2))
    }

    fn most_similar(&self, positive: &[&str], n: usize) -> Result<Vec<(String, f64)>> {
        let slots: Vec<usize> = positive
            .iter()
            .filter_map(|term| self.index.get(*term).copied())
            .collect();
        if slots.is_empty() {
            anyhow::bail!("None of the query terms are in the vocabulary");
        }

        // Centroid of the unit-length query vectors
        let mut centroid = vec![0.0_f64; self.dimensions];
        for &slot in &slots {
            let norm = self.norms[slot];
            if norm == 0.0 {
                continue;
            }
            for (c, &v) in centroid.iter_mut().zip(self.vectors[slot].iter()) {
                *c += f64::from(v) / norm;
            }
        }
        let centroid_norm = centroid.iter().map(|x| x * x).sum::<f64>().sqrt();
        if centroid_norm == 0.0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f64)> = (0..self.terms.len())
            .filter(|slot| !slots.contains(slot))
            .map(|slot| {
                let norm = self.norms[slot];
                let score = if norm == 0.0 {
                    0.0
                } else {
                    let dot: f64 = centroid
                        .iter()
                        .zip(self.vectors[slot].iter())
                        .map(|(&c, &v)| c * f64::from(v))
                        .sum();
                    (dot / centroid_norm / norm).clamp(-1.0, 1.0)
                };
                (slot, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(n);

        Ok(scored
            .into_iter()
            .map(|(slot, score)| (self.terms[slot].clone(), score))
            .collect())
    }

    fn len(&self) -> usize {
        self.terms.len()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}
