//! Experiment harness - measures how reliably the model reproduces expected verdicts.
//!
//! A preset lists questions with the verdict a careful human would give.
//! The runner asks every question several times through the clue pipeline
//! and collects the answers into an [`ExperimentReport`].

mod report;

pub use report::*;

use case_rules::{CaseFile, ClueId, Verdict};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

use crate::error::Result;
use crate::pipeline::EvaluationPipeline;

/// One question with its expected verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub clue_id: ClueId,
    pub question: String,
    pub expected: Verdict,
}

/// A set of test cases, loadable from TOML as `[[case]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperimentPreset {
    #[serde(default, rename = "case")]
    pub cases: Vec<TestCase>,
}

impl ExperimentPreset {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// Runs presets against a pipeline.
pub struct ExperimentRunner<'a> {
    pipeline: &'a EvaluationPipeline,
}

impl<'a> ExperimentRunner<'a> {
    pub fn new(pipeline: &'a EvaluationPipeline) -> Self {
        Self { pipeline }
    }

    /// Evaluate every case `runs` times, sequentially.
    ///
    /// Cases naming a clue absent from the case file are skipped.
    pub async fn run(&self, case: &CaseFile, preset: &ExperimentPreset, runs: usize) -> ExperimentReport {
        let mut report = ExperimentReport::new(runs);

        for run in 1..=runs {
            info!("Run {}/{} started", run, runs);

            for (index, test_case) in preset.cases.iter().enumerate() {
                let Some(clue) = case.clue(&test_case.clue_id) else {
                    error!("No clue with id '{}'; skipping case {}", test_case.clue_id, index);
                    continue;
                };

                let result = self
                    .pipeline
                    .evaluate_clue_question(&case.story, clue, &test_case.question)
                    .await;
                report.record(index, test_case, result);
            }

            info!("Run {}/{} finished", run, runs);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_toml() {
        let preset = ExperimentPreset::from_toml_str(
            r#"
[[case]]
clue_id = "easel"
question = "is the easel still in use?"
expected = "Incorrect"

[[case]]
clue_id = "ashes"
question = "did someone die in the fire?"
expected = "Incorrect"
"#,
        )
        .unwrap();

        assert_eq!(preset.cases.len(), 2);
        assert_eq!(preset.cases[0].clue_id, ClueId::from("easel"));
        assert_eq!(preset.cases[0].expected, Verdict::Incorrect);
    }

    #[test]
    fn test_preset_rejects_unknown_verdict() {
        let source = r#"
[[case]]
clue_id = "easel"
question = "q"
expected = "Sort of"
"#;
        assert!(ExperimentPreset::from_toml_str(source).is_err());
    }
}
