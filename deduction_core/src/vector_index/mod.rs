//! Vector index - in-memory embeddings with cosine top-K retrieval.
//!
//! The index only grows: a key is stored once and never overwritten or removed
//! for the lifetime of the session. All vectors share one dimensionality,
//! fixed by the first insertion.

mod similarity;

pub use similarity::*;

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Rejected insertions. These are hard errors, never silent drops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("cannot index an empty vector")]
    EmptyVector,

    #[error("dimension mismatch: index holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector for '{0}' contains non-finite values")]
    NonFinite(String),
}

/// A stored key and its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub key: String,
    pub vector: Vec<f32>,
}

/// A retrieved key with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredKey {
    pub key: String,
    pub similarity: f32,
}

/// Append-only map from key to embedding.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    /// Entries in insertion order; ties in ranking resolve by this order.
    entries: Vec<VectorEntry>,
    keys: HashSet<String>,
}

impl VectorIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vector under `key`.
    ///
    /// Returns `Ok(false)` without touching the index when the key is already
    /// present, whatever the new vector looks like. Otherwise the vector must
    /// be non-empty, finite and match the index dimensionality.
    pub fn insert(&mut self, key: impl Into<String>, vector: Vec<f32>) -> Result<bool, IndexError> {
        let key = key.into();

        if self.keys.contains(&key) {
            debug!("Vector for '{}' already indexed; ignoring", key);
            return Ok(false);
        }

        if vector.is_empty() {
            return Err(IndexError::EmptyVector);
        }

        if let Some(expected) = self.dimensions() {
            if vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        if vector.iter().any(|x| !x.is_finite()) {
            return Err(IndexError::NonFinite(key));
        }

        self.keys.insert(key.clone());
        self.entries.push(VectorEntry { key, vector });
        Ok(true)
    }

    /// Rank stored keys by descending cosine similarity to `query`.
    ///
    /// Returns at most `k` entries; ties keep insertion order. An empty index,
    /// `k == 0` or a query of the wrong dimensionality yields nothing.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<ScoredKey> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        if Some(query.len()) != self.dimensions() {
            warn!(
                "Query has {} dimensions but index holds {:?}; returning no matches",
                query.len(),
                self.dimensions()
            );
            return Vec::new();
        }

        let mut scored: Vec<ScoredKey> = self
            .entries
            .iter()
            .map(|entry| {
                let similarity = cosine_similarity(query, &entry.vector);
                ScoredKey {
                    key: entry.key.clone(),
                    // `+ 0.0` folds -0.0 into 0.0, which total_cmp would rank lower
                    similarity: if similarity.is_finite() { similarity + 0.0 } else { 0.0 },
                }
            })
            .collect();

        // sort_by is stable, so equal scores stay in insertion order
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);
        scored
    }

    /// Keys of the `k` most similar entries, most similar first.
    pub fn top_k_keys(&self, query: &[f32], k: usize) -> Vec<String> {
        self.top_k(query, k).into_iter().map(|s| s.key).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Get the stored vector for a key.
    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.vector.as_slice())
    }

    /// Dimensionality fixed by the first insertion, if any.
    pub fn dimensions(&self) -> Option<usize> {
        self.entries.first().map(|e| e.vector.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
