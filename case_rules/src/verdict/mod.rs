//! The verdict taxonomy used to judge questions and statements.

use serde::{Deserialize, Serialize};

/// Closed set of judgments a question can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The statement is fully correct.
    CompletelyCorrect,
    /// Contains no errors but is not complete.
    PartiallyCorrect,
    /// The statement contains an error.
    Incorrect,
    /// Cannot be judged from the known facts.
    Noncommittal,
    /// Unrelated to the clue, or not a judgeable question.
    Irrelevant,
    /// The evaluation itself failed: malformed output, transport error or empty content.
    /// Never offered to the model.
    Unexpected,
}

impl Verdict {
    /// Verdicts a model is allowed to emit, in prompt order.
    pub const MODEL_EMITTABLE: [Verdict; 5] = [
        Verdict::CompletelyCorrect,
        Verdict::PartiallyCorrect,
        Verdict::Incorrect,
        Verdict::Noncommittal,
        Verdict::Irrelevant,
    ];

    /// Every verdict, including the pipeline-only `Unexpected`.
    pub const ALL: [Verdict; 6] = [
        Verdict::CompletelyCorrect,
        Verdict::PartiallyCorrect,
        Verdict::Incorrect,
        Verdict::Noncommittal,
        Verdict::Irrelevant,
        Verdict::Unexpected,
    ];

    /// Wire label, identical to the variant name.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::CompletelyCorrect => "CompletelyCorrect",
            Verdict::PartiallyCorrect => "PartiallyCorrect",
            Verdict::Incorrect => "Incorrect",
            Verdict::Noncommittal => "Noncommittal",
            Verdict::Irrelevant => "Irrelevant",
            Verdict::Unexpected => "Unexpected",
        }
    }

    /// Resolve a label emitted by the model.
    ///
    /// Matching is case-insensitive and restricted to [`Verdict::MODEL_EMITTABLE`];
    /// `"Unexpected"` and anything else yield `None`.
    pub fn from_model_label(label: &str) -> Option<Verdict> {
        let label = label.trim();
        Self::MODEL_EMITTABLE
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(label))
    }

    /// Parse any label including `Unexpected`, case-insensitively. Used for
    /// content authored by people (experiment presets), never for model output.
    pub fn from_label(label: &str) -> Option<Verdict> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(label))
    }

    pub fn is_model_emittable(&self) -> bool {
        !matches!(self, Verdict::Unexpected)
    }

    /// Only a complete answer counts as solving a quiz or password door.
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::CompletelyCorrect)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A verdict with the explanation that accompanies it.
///
/// Immutable once built: either decoded from model output or produced by an
/// explicit failure path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    verdict: Verdict,
    explanation: String,
}

impl EvaluationResult {
    pub fn new(verdict: Verdict, explanation: impl Into<String>) -> Self {
        Self {
            verdict,
            explanation: explanation.into(),
        }
    }

    /// A failed evaluation carrying a diagnostic or transport error text.
    pub fn unexpected(explanation: impl Into<String>) -> Self {
        Self::new(Verdict::Unexpected, explanation)
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Whether the evaluation failed rather than producing a judgment.
    pub fn is_unexpected(&self) -> bool {
        self.verdict == Verdict::Unexpected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_label_case_insensitive() {
        assert_eq!(
            Verdict::from_model_label("incorrect"),
            Some(Verdict::Incorrect)
        );
        assert_eq!(
            Verdict::from_model_label("COMPLETELYCORRECT"),
            Some(Verdict::CompletelyCorrect)
        );
        assert_eq!(
            Verdict::from_model_label(" Irrelevant "),
            Some(Verdict::Irrelevant)
        );
    }

    #[test]
    fn test_model_cannot_emit_unexpected() {
        assert_eq!(Verdict::from_model_label("Unexpected"), None);
        assert_eq!(Verdict::from_label("unexpected"), Some(Verdict::Unexpected));
    }

    #[test]
    fn test_unknown_labels_rejected() {
        assert_eq!(Verdict::from_model_label(""), None);
        assert_eq!(Verdict::from_model_label("Correct"), None);
        assert_eq!(Verdict::from_model_label("0"), None);
    }

    #[test]
    fn test_label_round_trips_display() {
        for verdict in Verdict::ALL {
            assert_eq!(verdict.to_string(), verdict.label());
            assert_eq!(Verdict::from_label(verdict.label()), Some(verdict));
        }
    }

    #[test]
    fn test_is_correct() {
        assert!(Verdict::CompletelyCorrect.is_correct());
        assert!(!Verdict::PartiallyCorrect.is_correct());
        assert!(!Verdict::Unexpected.is_model_emittable());
    }

    #[test]
    fn test_serialized_as_label() {
        let json = serde_json::to_string(&Verdict::PartiallyCorrect).unwrap();
        assert_eq!(json, "\"PartiallyCorrect\"");
    }

    #[test]
    fn test_unexpected_result() {
        let result = EvaluationResult::unexpected("API Error: timeout");
        assert!(result.is_unexpected());
        assert_eq!(result.explanation(), "API Error: timeout");
    }
}
