//! Clue definitions - the discoverable units of evidence in a case.

use serde::{Deserialize, Serialize};

/// Unique identifier for clues, e.g. `painting_final`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClueId(pub String);

impl ClueId {
    /// Create a clue ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ClueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A piece of evidence the player can inspect and question.
///
/// Clues are owned by the case content and are read-only to the evaluation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueFact {
    pub id: ClueId,

    /// Name shown in the clue panel.
    pub display_name: String,

    /// Facts the model judges questions against. Only information directly
    /// related to this clue belongs here.
    pub facts_for_model: String,

    /// What the player sees when inspecting the clue.
    #[serde(default)]
    pub description_for_player: String,

    /// Route questions about this clue through cross-clue retrieval.
    #[serde(default)]
    pub use_retrieval_mode: bool,
}

impl ClueFact {
    /// Create a new clue with the given id, name and model-facing facts.
    pub fn new(
        id: impl Into<ClueId>,
        display_name: impl Into<String>,
        facts_for_model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            facts_for_model: facts_for_model.into(),
            description_for_player: String::new(),
            use_retrieval_mode: false,
        }
    }

    /// Set the player-facing description.
    pub fn with_player_description(mut self, description: impl Into<String>) -> Self {
        self.description_for_player = description.into();
        self
    }

    /// Set whether questions on this clue use retrieval mode.
    pub fn with_retrieval_mode(mut self, enabled: bool) -> Self {
        self.use_retrieval_mode = enabled;
        self
    }

    /// Whether the clue carries any facts worth embedding or judging against.
    pub fn has_facts(&self) -> bool {
        !self.facts_for_model.trim().is_empty()
    }
}
