//! Gateway configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "CASEBOOK_API_KEY";

/// Configuration for an OpenAI-compatible model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// API base URL; `/chat/completions` and `/embeddings` are appended.
    pub base_url: String,

    /// Bearer token. Usually supplied through `CASEBOOK_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Completion model id.
    pub model: String,

    /// Embedding model id.
    pub embedding_model: String,

    /// System message sent ahead of every prompt.
    pub system_prompt: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: env::var(API_KEY_ENV).unwrap_or_default(),
            model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    /// Parse a TOML configuration. A `CASEBOOK_API_KEY` in the environment
    /// takes precedence over a key in the file.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let mut config: GatewayConfig = toml::from_str(source)?;
        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.api_key = key;
            }
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}
