//! Evaluation pipeline - prompts, dispatch and typed results for every mode.
//!
//! Each evaluation follows the same shape:
//! 1. **Prompt**: Build the mode-specific prompt
//! 2. **Dispatch**: One completion request to the model gateway, no retries
//! 3. **Parse**: Decode the completion with the response parser
//! 4. **Fold**: Turn transport and parse failures into `Unexpected`, `0` or a typed failure
//!
//! Global statements additionally embed the statement first and retrieve the
//! most similar discovered clues from the [`EvidenceIndex`].

mod prompts;
mod retrieval;

pub use retrieval::*;

use case_rules::{ClueFact, EvaluationResult, StoryTruth, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::gateway::{GatewayError, ModelGateway};
use crate::response_parser::{
    parse_judgement, parse_scored_points, parse_similarity, parse_verdict, ParseFailure,
    ScoredPoints, TheorySimilarity,
};

/// Typed failure of an evaluation, carried in results rather than raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationFailure {
    /// Completion request failed or timed out.
    #[error("{0}")]
    Transport(#[from] GatewayError),

    /// Completion arrived but could not be decoded.
    #[error("{0}")]
    Malformed(#[from] ParseFailure),

    /// Embedding the statement for retrieval failed.
    #[error("Retrieval failed: {0}")]
    Retrieval(GatewayError),

    /// Required case content is absent; the model was not contacted.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),
}

impl EvaluationFailure {
    /// Fold into an `Unexpected` result.
    pub fn into_evaluation(self) -> EvaluationResult {
        match self {
            EvaluationFailure::Malformed(failure) => failure.into_evaluation(),
            other => EvaluationResult::unexpected(other.to_string()),
        }
    }
}

/// Outcome of scoring a final verdict against the checklist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinalScore {
    pub score: u32,
    /// Matched checklist points, in checklist order.
    pub matched_points: Vec<String>,
}

/// Tunables for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Clues retrieved for a global statement when the caller has no preference.
    pub default_top_k: usize,

    /// Similarity a final theory needs to be accepted.
    pub theory_threshold: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_top_k: 3,
            theory_threshold: 0.8,
        }
    }
}

/// Builds prompts, calls the model gateway and parses what comes back.
pub struct EvaluationPipeline {
    gateway: Arc<dyn ModelGateway>,
    evidence: Arc<RwLock<EvidenceIndex>>,
    settings: PipelineSettings,
}

impl EvaluationPipeline {
    /// Create a pipeline over a gateway and a shared evidence index.
    pub fn new(gateway: Arc<dyn ModelGateway>, evidence: Arc<RwLock<EvidenceIndex>>) -> Self {
        Self::with_settings(gateway, evidence, PipelineSettings::default())
    }

    pub fn with_settings(
        gateway: Arc<dyn ModelGateway>,
        evidence: Arc<RwLock<EvidenceIndex>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            gateway,
            evidence,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn evidence(&self) -> &Arc<RwLock<EvidenceIndex>> {
        &self.evidence
    }

    /// Judge a question about one clue.
    ///
    /// A transport failure returns `Unexpected` with the error text.
    pub async fn evaluate_clue_question(
        &self,
        story: &StoryTruth,
        clue: &ClueFact,
        question: &str,
    ) -> EvaluationResult {
        debug!("Evaluating question on clue '{}': {}", clue.id, question);
        let prompt = prompts::clue_question_prompt(story, clue, question);
        self.complete_verdict(&prompt).await
    }

    /// Judge a quiz answer, returning the full result.
    ///
    /// Accepts either a strict `is_correct` judgment or one of the softer verdicts.
    pub async fn judge_answer(
        &self,
        question: &str,
        candidate_answer: &str,
        success_criterion: &str,
    ) -> EvaluationResult {
        let prompt = prompts::quiz_judge_prompt(question, candidate_answer, success_criterion);

        match self.gateway.complete(&prompt).await {
            Ok(raw) => parse_judgement(&raw).unwrap_or_else(ParseFailure::into_evaluation),
            Err(e) => {
                warn!("Quiz judgment request failed: {}", e);
                EvaluationFailure::Transport(e).into_evaluation()
            }
        }
    }

    /// Judge a quiz answer against a success criterion.
    pub async fn judge_boolean_answer(
        &self,
        question: &str,
        candidate_answer: &str,
        success_criterion: &str,
    ) -> Verdict {
        self.judge_answer(question, candidate_answer, success_criterion)
            .await
            .verdict()
    }

    /// Score a free-form final statement against the checklist.
    ///
    /// The matched points follow checklist order whatever order the model
    /// used. Any failure scores zero.
    pub async fn score_final_verdict(&self, scoring_points: &[String], statement: &str) -> FinalScore {
        if scoring_points.is_empty() {
            warn!("{}", EvaluationFailure::MissingConfiguration("scoring points"));
            return FinalScore::default();
        }

        let prompt = prompts::final_verdict_prompt(scoring_points, statement);
        let raw = match self.gateway.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Final verdict request failed: {}", e);
                return FinalScore::default();
            }
        };

        match parse_scored_points(&raw) {
            Ok(scored) => order_by_checklist(scoring_points, &scored),
            Err(_) => FinalScore::default(),
        }
    }

    /// Judge a statement against the clues most similar to it.
    ///
    /// With nothing to retrieve this is exactly [`Self::evaluate_clue_question`]
    /// on `fallback_clue`. A failed statement embedding is `Unexpected`.
    pub async fn evaluate_global_statement(
        &self,
        story: &StoryTruth,
        fallback_clue: &ClueFact,
        statement: &str,
        top_k: usize,
    ) -> EvaluationResult {
        let retrieved = match self.retrieve(statement, top_k).await {
            Ok(retrieved) => retrieved,
            Err(e) => {
                error!("Retrieval for global statement failed: {}", e);
                return EvaluationFailure::Retrieval(e).into_evaluation();
            }
        };

        if retrieved.is_empty() {
            debug!(
                "No evidence retrieved; evaluating against clue '{}'",
                fallback_clue.id
            );
            return self
                .evaluate_clue_question(story, fallback_clue, statement)
                .await;
        }

        info!(
            "Evaluating global statement against {} retrieved clue(s)",
            retrieved.len()
        );
        let prompt = prompts::global_statement_prompt(story, &retrieved, statement);
        self.complete_verdict(&prompt).await
    }

    /// Rate how close a theory is to the story truth.
    ///
    /// A missing story or blank theory fails without contacting the model.
    pub async fn evaluate_final_theory(
        &self,
        story: Option<&StoryTruth>,
        theory: &str,
    ) -> std::result::Result<TheorySimilarity, EvaluationFailure> {
        let story = match story {
            Some(story) if story.has_solution() => story,
            _ => return Err(EvaluationFailure::MissingConfiguration("story truth")),
        };
        if theory.trim().is_empty() {
            return Err(EvaluationFailure::MissingConfiguration("player theory"));
        }

        let prompt = prompts::final_theory_prompt(story, theory);
        let raw = self.gateway.complete(&prompt).await?;
        let similarity = parse_similarity(&raw)?;

        info!("Final theory similarity: {:.2}", similarity.similarity);
        Ok(similarity)
    }

    /// Embed a discovered clue's facts and add it to the evidence index.
    ///
    /// Returns `Ok(false)` without calling the model when the clue is already
    /// indexed or has no facts.
    pub async fn index_clue(&self, clue: &ClueFact) -> Result<bool> {
        if !clue.has_facts() || self.evidence.read().await.contains(&clue.id) {
            return Ok(false);
        }

        let vector = self.gateway.embed(&clue.facts_for_model).await.map_err(|e| {
            error!("Embedding clue '{}' failed: {}", clue.display_name, e);
            e
        })?;

        let inserted = self.evidence.write().await.insert(clue.clone(), vector)?;
        if inserted {
            info!("Clue '{}' added to the evidence index", clue.display_name);
        }
        Ok(inserted)
    }

    /// Retrieve the `top_k` discovered clues most similar to `text`.
    ///
    /// An empty index or `top_k == 0` returns nothing without calling the
    /// model. An empty embedding is treated as nothing relevant.
    pub async fn retrieve(
        &self,
        text: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedClue>, GatewayError> {
        if top_k == 0 || text.trim().is_empty() || self.evidence.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.gateway.embed(text).await?;
        if query.is_empty() {
            warn!("Model returned an empty embedding for retrieval");
            return Ok(Vec::new());
        }

        Ok(self.evidence.read().await.relevant_clues(&query, top_k))
    }

    async fn complete_verdict(&self, prompt: &str) -> EvaluationResult {
        match self.gateway.complete(prompt).await {
            Ok(raw) => parse_verdict(&raw).unwrap_or_else(ParseFailure::into_evaluation),
            Err(e) => {
                warn!("Evaluation request failed: {}", e);
                EvaluationFailure::Transport(e).into_evaluation()
            }
        }
    }
}

fn normalize_point(point: &str) -> String {
    point.trim().to_lowercase()
}

/// Re-derive the matched points in checklist order.
///
/// Points the model flagged that are not on the checklist are ignored.
fn order_by_checklist(scoring_points: &[String], scored: &ScoredPoints) -> FinalScore {
    let matched: HashSet<String> = scored.matched_points().map(normalize_point).collect();

    let matched_points: Vec<String> = scoring_points
        .iter()
        .filter(|p| matched.contains(&normalize_point(p)))
        .cloned()
        .collect();

    if matched_points.len() < scored.score() {
        debug!(
            "Model flagged {} point(s) but only {} are on the checklist",
            scored.score(),
            matched_points.len()
        );
    }

    FinalScore {
        score: matched_points.len() as u32,
        matched_points,
    }
}
