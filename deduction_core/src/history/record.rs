//! Dialogue record definitions - committed question/answer pairs.

use case_rules::{ClueId, EvaluationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for dialogue records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Create a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A question asked about a clue together with its evaluation.
///
/// Two records may carry identical text; the `id` tells them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub id: RecordId,
    pub clue_id: ClueId,
    pub question: String,
    pub result: EvaluationResult,
}

impl DialogueRecord {
    pub(crate) fn new(clue_id: ClueId, question: String, result: EvaluationResult) -> Self {
        Self {
            id: RecordId::new(),
            clue_id,
            question,
            result,
        }
    }
}
