//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use case_rules::{ClueFact, StoryTruth};
use deduction_core::{GatewayError, ModelGateway};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Gateway double that replays scripted replies and records every prompt.
#[derive(Default)]
pub struct ScriptedGateway {
    completions: Mutex<VecDeque<Result<String, GatewayError>>>,
    embeddings: Mutex<HashMap<String, Vec<f32>>>,
    embed_failure: Mutex<Option<GatewayError>>,
    prompts: Mutex<Vec<String>>,
    complete_calls: AtomicUsize,
    embed_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a completion reply.
    pub fn reply(self, raw: &str) -> Self {
        self.completions
            .lock()
            .unwrap()
            .push_back(Ok(raw.to_string()));
        self
    }

    /// Queue a completion failure.
    pub fn fail(self, error: GatewayError) -> Self {
        self.completions.lock().unwrap().push_back(Err(error));
        self
    }

    /// Answer `embed(text)` with `vector`.
    pub fn embedding(self, text: &str, vector: Vec<f32>) -> Self {
        self.embeddings
            .lock()
            .unwrap()
            .insert(text.to_string(), vector);
        self
    }

    /// Make every embedding request fail.
    pub fn failing_embeddings(self, error: GatewayError) -> Self {
        *self.embed_failure.lock().unwrap() = Some(error);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Network("script exhausted".to_string())))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.embed_failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.embeddings
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .ok_or(GatewayError::InvalidResponse)
    }
}

/// Story truth of the burned studio case.
pub fn test_story() -> StoryTruth {
    StoryTruth::new("The painter staged the studio fire to hide that he had stopped painting months ago.")
        .with_scoring_points(vec![
            "The fire was staged".to_string(),
            "The painter set it".to_string(),
            "He had stopped painting".to_string(),
        ])
        .with_score_threshold(2)
}

pub fn easel_clue() -> ClueFact {
    ClueFact::new("easel", "Easel", "The easel is unused. Dust covers the canvas tray.")
}

pub fn ashes_clue() -> ClueFact {
    ClueFact::new("ashes", "Ashes", "The ashes smell of lamp oil poured on the floor.")
}

pub fn receipt_clue() -> ClueFact {
    ClueFact::new("receipt", "Receipt", "A receipt for two litres of lamp oil, dated the day of the fire.")
}

pub fn verdict_reply(label: &str, explanation: &str) -> String {
    format!(
        r#"{{"evaluation": "{}", "explanation": "{}"}}"#,
        label, explanation
    )
}
