//! Evidence index - discovered clues with their embeddings.

use case_rules::{ClueFact, ClueId};
use std::collections::HashMap;

use crate::vector_index::{IndexError, VectorIndex};

/// A clue returned by retrieval with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedClue {
    pub clue: ClueFact,
    pub similarity: f32,
}

/// Vector index over discovered clues, keyed by clue id.
#[derive(Debug, Default)]
pub struct EvidenceIndex {
    vectors: VectorIndex,
    clues: HashMap<ClueId, ClueFact>,
}

impl EvidenceIndex {
    /// Create an empty evidence index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a clue's embedding. An already indexed clue is left as it is
    /// and `Ok(false)` is returned.
    pub fn insert(&mut self, clue: ClueFact, vector: Vec<f32>) -> Result<bool, IndexError> {
        let inserted = self.vectors.insert(clue.id.as_str(), vector)?;
        if inserted {
            self.clues.insert(clue.id.clone(), clue);
        }
        Ok(inserted)
    }

    /// The `k` clues most similar to `query`, most similar first.
    pub fn relevant_clues(&self, query: &[f32], k: usize) -> Vec<RetrievedClue> {
        self.vectors
            .top_k(query, k)
            .into_iter()
            .filter_map(|scored| {
                self.clues
                    .get(&ClueId::new(scored.key))
                    .map(|clue| RetrievedClue {
                        clue: clue.clone(),
                        similarity: scored.similarity,
                    })
            })
            .collect()
    }

    pub fn contains(&self, id: &ClueId) -> bool {
        self.clues.contains_key(id)
    }

    /// Get an indexed clue by ID.
    pub fn clue(&self, id: &ClueId) -> Option<&ClueFact> {
        self.clues.get(id)
    }

    pub fn vectors(&self) -> &VectorIndex {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.clues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }
}
