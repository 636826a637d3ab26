//! HTTP gateway for OpenAI-compatible chat and embedding endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{GatewayConfig, GatewayError, ModelGateway};

/// Gateway that talks to a remote model over HTTP.
pub struct HttpGateway {
    config: GatewayConfig,
    client: Client,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpGateway {
    /// Create a gateway from configuration. Fails when no API key is set.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if config.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                secs: self.config.timeout_secs,
            }
        } else {
            GatewayError::Network(err.to_string())
        }
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            error!("Model API returned {}: {}", status, text);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("Raw response received: {}", text);

        serde_json::from_str(&text).map_err(|e| {
            error!("Model API response did not decode ({}): {}", e, text);
            GatewayError::InvalidResponse
        })
    }
}

#[async_trait]
impl ModelGateway for HttpGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response: ChatResponse = self
            .post_json(&self.config.completions_url(), &request)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GatewayError::InvalidResponse)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: text,
        };

        let response: EmbeddingResponse = self
            .post_json(&self.config.embeddings_url(), &request)
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(GatewayError::InvalidResponse)
    }
}
