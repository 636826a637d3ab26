//! Case session - the process-scoped owner of every evaluation service.
//!
//! One session exists per play-through. It owns the pipeline, the evidence
//! index and the dialogue history, and is the only place they are wired
//! together. Dropping the session discards all state.

use case_rules::{ClueFact, ClueId, EvaluationResult, StoryTruth, Verdict};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::Result;
use crate::gateway::ModelGateway;
use crate::history::{DialogueRecord, HistoryCorrelator};
use crate::pipeline::{EvaluationFailure, EvaluationPipeline, EvidenceIndex, FinalScore, PipelineSettings};
use crate::response_parser::TheorySimilarity;

/// Session-level tunables.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub pipeline: PipelineSettings,

    /// Pending questions older than this are evicted before each new question.
    /// `None` keeps them until their result arrives.
    pub pending_ttl: Option<Duration>,
}

/// Evaluation services for one play session.
pub struct CaseSession {
    story: Option<StoryTruth>,
    pipeline: EvaluationPipeline,
    evidence: Arc<RwLock<EvidenceIndex>>,
    history: Mutex<HistoryCorrelator>,
    settings: SessionSettings,
}

impl CaseSession {
    /// Create a session with default settings.
    pub fn new(gateway: Arc<dyn ModelGateway>, story: Option<StoryTruth>) -> Self {
        Self::with_settings(gateway, story, SessionSettings::default())
    }

    pub fn with_settings(
        gateway: Arc<dyn ModelGateway>,
        story: Option<StoryTruth>,
        settings: SessionSettings,
    ) -> Self {
        let evidence = Arc::new(RwLock::new(EvidenceIndex::new()));
        let pipeline =
            EvaluationPipeline::with_settings(gateway, evidence.clone(), settings.pipeline.clone());

        Self {
            story,
            pipeline,
            evidence,
            history: Mutex::new(HistoryCorrelator::new()),
            settings,
        }
    }

    pub fn story(&self) -> Option<&StoryTruth> {
        self.story.as_ref()
    }

    pub fn pipeline(&self) -> &EvaluationPipeline {
        &self.pipeline
    }

    /// Mark a clue as discovered, making it available to retrieval.
    pub async fn discover_clue(&self, clue: &ClueFact) -> Result<bool> {
        self.pipeline.index_clue(clue).await
    }

    pub async fn discovered_count(&self) -> usize {
        self.evidence.read().await.len()
    }

    /// Ask a question about a clue and record it in the clue's history.
    ///
    /// The question is registered as pending before the model is contacted
    /// and committed once the result is in, whatever the verdict. If the same
    /// text is already pending for another ask, this result is returned but
    /// not recorded.
    pub async fn ask(&self, clue: &ClueFact, question: &str) -> EvaluationResult {
        let registered = {
            let mut history = self.history.lock().await;
            if let Some(ttl) = self.settings.pending_ttl {
                history.purge_stale(ttl);
            }
            history.register_pending(clue.id.clone(), question)
        };

        let result = match &self.story {
            None => EvaluationFailure::MissingConfiguration("story truth").into_evaluation(),
            Some(story) if clue.use_retrieval_mode => {
                self.pipeline
                    .evaluate_global_statement(
                        story,
                        clue,
                        question,
                        self.settings.pipeline.default_top_k,
                    )
                    .await
            }
            Some(story) => {
                self.pipeline
                    .evaluate_clue_question(story, clue, question)
                    .await
            }
        };

        if !registered {
            debug!(
                "'{}' was already pending; result for clue '{}' not recorded",
                question, clue.id
            );
            return result;
        }

        if self.history.lock().await.commit(question, result.clone()).is_none() {
            debug!("Result for '{}' was not recorded", question);
        }
        result
    }

    /// Judge a quiz answer against its success criterion.
    pub async fn judge_answer(
        &self,
        question: &str,
        candidate_answer: &str,
        success_criterion: &str,
    ) -> Verdict {
        self.pipeline
            .judge_boolean_answer(question, candidate_answer, success_criterion)
            .await
    }

    /// Score a final statement against the story's checklist.
    pub async fn score_final_verdict(&self, statement: &str) -> FinalScore {
        match &self.story {
            Some(story) => {
                self.pipeline
                    .score_final_verdict(&story.scoring_points, statement)
                    .await
            }
            None => FinalScore::default(),
        }
    }

    /// Rate a final theory against the story truth.
    pub async fn evaluate_final_theory(
        &self,
        theory: &str,
    ) -> std::result::Result<TheorySimilarity, EvaluationFailure> {
        self.pipeline
            .evaluate_final_theory(self.story.as_ref(), theory)
            .await
    }

    /// Whether a theory similarity passes the configured threshold.
    pub fn theory_accepted(&self, similarity: &TheorySimilarity) -> bool {
        similarity.meets(self.settings.pipeline.theory_threshold)
    }

    /// Committed records for a clue, oldest first.
    pub async fn records_for_clue(&self, clue_id: &ClueId) -> Vec<DialogueRecord> {
        self.history.lock().await.records_for_clue(clue_id).to_vec()
    }

    pub async fn delete_record(&self, record: &DialogueRecord) -> bool {
        self.history.lock().await.delete_record(record)
    }

    pub async fn delete_clue_history(&self, clue_id: &ClueId) -> bool {
        self.history.lock().await.delete_clue_history(clue_id)
    }

    pub async fn pending_count(&self) -> usize {
        self.history.lock().await.pending_count()
    }

    /// Clear the dialogue history. Discovered evidence is kept.
    pub async fn reset_history(&self) {
        self.history.lock().await.reset();
    }
}
