//! Response parser - decodes free-form model output into typed results.
//!
//! Every parse returns a `Result`; nothing panics or escapes past this
//! boundary. A failure keeps the raw model text for diagnostics, while the
//! explanation it turns into is a fixed message that never exposes that text.

mod fence;

pub use fence::*;

use case_rules::{EvaluationResult, Verdict};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Why model output could not be turned into a result.
///
/// The display text is the fixed diagnostic shown in place of an explanation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailureKind {
    /// Not valid JSON, or not the expected object shape.
    #[error("Failed to parse model response.")]
    Malformed { reason: String },

    /// Valid object, but the `evaluation` field is missing or empty.
    #[error("Model returned a valid but empty response.")]
    EmptyEvaluation,

    /// `evaluation` names no model-emittable verdict. The label is kept for logs.
    #[error("Model returned an unrecognized evaluation value.")]
    UnknownVerdict(String),
}

/// A failed parse, retaining the raw model output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct ParseFailure {
    pub kind: ParseFailureKind,
    raw: String,
}

impl ParseFailure {
    fn new(kind: ParseFailureKind, raw: &str) -> Self {
        warn!("Model response rejected ({:?}). Raw response: {}", kind, raw);
        Self {
            kind,
            raw: raw.to_string(),
        }
    }

    /// The untouched model output, for logs and reports only.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Fold into an `Unexpected` result carrying the fixed diagnostic.
    pub fn into_evaluation(self) -> EvaluationResult {
        EvaluationResult::unexpected(self.kind.to_string())
    }
}

/// Wire shape of single-verdict answers.
#[derive(Debug, Deserialize)]
struct VerdictPayload {
    #[serde(default)]
    evaluation: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Strict correct/incorrect judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanJudgement {
    pub is_correct: bool,
    pub explanation: String,
}

impl BooleanJudgement {
    /// Map onto the two extreme verdicts.
    pub fn into_evaluation(self) -> EvaluationResult {
        let verdict = if self.is_correct {
            Verdict::CompletelyCorrect
        } else {
            Verdict::Incorrect
        };
        EvaluationResult::new(verdict, self.explanation)
    }
}

/// One checklist point as judged by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointMatch {
    pub point: String,
    pub matched: bool,
}

/// Model output for final-verdict scoring, in model emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPoints {
    pub matches: Vec<PointMatch>,
}

impl ScoredPoints {
    /// Number of points flagged as matched.
    pub fn score(&self) -> usize {
        self.matches.iter().filter(|m| m.matched).count()
    }

    /// Points flagged as matched, as emitted.
    pub fn matched_points(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter(|m| m.matched)
            .map(|m| m.point.as_str())
    }
}

/// Similarity between a theory and the story truth.
///
/// Values are not clamped; a misbehaving model may emit numbers outside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheorySimilarity {
    pub similarity: f64,
    pub reason: String,
}

impl TheorySimilarity {
    /// Whether the similarity reaches the caller's threshold (`>=`).
    pub fn meets(&self, threshold: f64) -> bool {
        self.similarity >= threshold
    }
}

/// Strip fences, then decode into `T`, requiring a JSON object.
fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, ParseFailure> {
    let cleaned = strip_code_fence(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned).map_err(|e| {
        ParseFailure::new(ParseFailureKind::Malformed { reason: e.to_string() }, raw)
    })?;

    if !value.is_object() {
        return Err(ParseFailure::new(
            ParseFailureKind::Malformed {
                reason: "expected a JSON object".to_string(),
            },
            raw,
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        ParseFailure::new(ParseFailureKind::Malformed { reason: e.to_string() }, raw)
    })
}

fn verdict_from_payload(payload: VerdictPayload, raw: &str) -> Result<EvaluationResult, ParseFailure> {
    let label = match payload.evaluation {
        Some(label) if !label.trim().is_empty() => label,
        _ => return Err(ParseFailure::new(ParseFailureKind::EmptyEvaluation, raw)),
    };

    match Verdict::from_model_label(&label) {
        Some(verdict) => Ok(EvaluationResult::new(
            verdict,
            payload.explanation.unwrap_or_default(),
        )),
        None => Err(ParseFailure::new(ParseFailureKind::UnknownVerdict(label), raw)),
    }
}

/// Parse a `{"evaluation", "explanation"}` answer.
///
/// The explanation is passed through verbatim.
pub fn parse_verdict(raw: &str) -> Result<EvaluationResult, ParseFailure> {
    let payload: VerdictPayload = decode(raw)?;
    verdict_from_payload(payload, raw)
}

/// Parse a `{"is_correct", "explanation"}` answer.
pub fn parse_boolean_judgement(raw: &str) -> Result<BooleanJudgement, ParseFailure> {
    decode(raw)
}

/// Parse a quiz judgment that may come in either shape.
///
/// An object carrying an `evaluation` field is read as a single verdict;
/// otherwise it must be a boolean judgment.
pub fn parse_judgement(raw: &str) -> Result<EvaluationResult, ParseFailure> {
    let value: serde_json::Map<String, serde_json::Value> = decode(raw)?;

    if value.contains_key("evaluation") {
        let payload: VerdictPayload =
            serde_json::from_value(serde_json::Value::Object(value)).map_err(|e| {
                ParseFailure::new(ParseFailureKind::Malformed { reason: e.to_string() }, raw)
            })?;
        return verdict_from_payload(payload, raw);
    }

    let judgement: BooleanJudgement = serde_json::from_value(serde_json::Value::Object(value))
        .map_err(|e| {
            ParseFailure::new(ParseFailureKind::Malformed { reason: e.to_string() }, raw)
        })?;
    Ok(judgement.into_evaluation())
}

/// Parse a `{"matches": [{"point", "matched"}]}` answer.
///
/// Points are not checked against any checklist here.
pub fn parse_scored_points(raw: &str) -> Result<ScoredPoints, ParseFailure> {
    decode(raw)
}

/// Parse a `{"similarity", "reason"}` answer.
pub fn parse_similarity(raw: &str) -> Result<TheorySimilarity, ParseFailure> {
    decode(raw)
}
