//! Story truth and the case file that bundles it with its clues.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::clues::{ClueFact, ClueId};

/// The authoritative hidden solution every clue is consistent with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoryTruth {
    /// Most detailed, objective account of what happened. Shown only to the model.
    pub full_solution: String,

    /// Exhaustive checklist a final verdict is scored against, in order.
    #[serde(default)]
    pub scoring_points: Vec<String>,

    /// Minimum number of matched points for a final verdict to pass.
    #[serde(default)]
    pub score_threshold: u32,
}

impl StoryTruth {
    /// Create a story truth with the given solution and no scoring checklist.
    pub fn new(full_solution: impl Into<String>) -> Self {
        Self {
            full_solution: full_solution.into(),
            scoring_points: Vec::new(),
            score_threshold: 0,
        }
    }

    /// Set the scoring checklist.
    pub fn with_scoring_points(
        mut self,
        points: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.scoring_points = points.into_iter().map(Into::into).collect();
        self
    }

    /// Set the pass threshold.
    pub fn with_score_threshold(mut self, threshold: u32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Whether a solution has been authored at all.
    pub fn has_solution(&self) -> bool {
        !self.full_solution.trim().is_empty()
    }

    /// Check whether a final-verdict score reaches the threshold.
    pub fn is_passing(&self, score: u32) -> bool {
        score >= self.score_threshold
    }
}

/// Errors raised while loading case content.
#[derive(Error, Debug)]
pub enum CaseFileError {
    #[error("Failed to read case file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid case file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Duplicate clue id: {0}")]
    DuplicateClue(ClueId),
}

/// A complete case: the story truth plus every clue that can be discovered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CaseFile {
    pub story: StoryTruth,

    #[serde(default, rename = "clue")]
    pub clues: Vec<ClueFact>,
}

impl CaseFile {
    /// Create a new case file from a story and its clues.
    pub fn new(story: StoryTruth, clues: Vec<ClueFact>) -> Self {
        Self { story, clues }
    }

    /// Parse a case file from TOML, rejecting duplicate clue ids.
    pub fn from_toml_str(source: &str) -> Result<Self, CaseFileError> {
        let case: CaseFile = toml::from_str(source)?;

        let mut seen = HashSet::new();
        for clue in &case.clues {
            if !seen.insert(&clue.id) {
                return Err(CaseFileError::DuplicateClue(clue.id.clone()));
            }
        }

        Ok(case)
    }

    /// Load a case file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaseFileError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Get a clue by ID.
    pub fn clue(&self, id: &ClueId) -> Option<&ClueFact> {
        self.clues.iter().find(|c| &c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE: &str = r#"
[story]
full_solution = "The painter staged his own disappearance."
scoring_points = ["The painter is alive", "The fire was staged"]
score_threshold = 2

[[clue]]
id = "easel"
display_name = "Dusty Easel"
facts_for_model = "The easel is unused."

[[clue]]
id = "ashes"
display_name = "Ashes"
facts_for_model = "The ashes contain no bone."
description_for_player = "A pile of grey ash."
use_retrieval_mode = true
"#;

    #[test]
    fn test_parse_case_file() {
        let case = CaseFile::from_toml_str(CASE).unwrap();

        assert!(case.story.has_solution());
        assert_eq!(case.story.scoring_points.len(), 2);
        assert_eq!(case.clues.len(), 2);

        let ashes = case.clue(&ClueId::from("ashes")).unwrap();
        assert!(ashes.use_retrieval_mode);
        assert_eq!(ashes.description_for_player, "A pile of grey ash.");

        let easel = case.clue(&ClueId::from("easel")).unwrap();
        assert!(!easel.use_retrieval_mode);
    }

    #[test]
    fn test_duplicate_clue_rejected() {
        let source = r#"
[story]
full_solution = "x"

[[clue]]
id = "a"
display_name = "A"
facts_for_model = "one"

[[clue]]
id = "a"
display_name = "A again"
facts_for_model = "two"
"#;
        let err = CaseFile::from_toml_str(source).unwrap_err();
        assert!(matches!(err, CaseFileError::DuplicateClue(id) if id.as_str() == "a"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            CaseFile::from_toml_str("[story"),
            Err(CaseFileError::Toml(_))
        ));
    }

    #[test]
    fn test_score_threshold() {
        let story = StoryTruth::new("truth")
            .with_scoring_points(["A", "B", "C"])
            .with_score_threshold(2);

        assert!(!story.is_passing(1));
        assert!(story.is_passing(2));
        assert!(story.is_passing(3));
    }

    #[test]
    fn test_blank_solution() {
        assert!(!StoryTruth::default().has_solution());
        assert!(!StoryTruth::new("  ").has_solution());
    }
}
