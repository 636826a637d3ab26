//! Model gateway - the narrow contract to the remote language model.
//!
//! A gateway turns a prompt into a completion and a text into an embedding.
//! Timeouts are owned here and reported as an ordinary failure.

mod config;
mod http;

pub use config::*;
pub use http::*;

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failures reported by a gateway.
///
/// The display text is what a failed evaluation shows as its explanation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No response within the configured timeout
    #[error("API Error: request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection or protocol failure
    #[error("API Error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("API Error: HTTP {status}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("API Error: Invalid response format.")]
    InvalidResponse,

    /// Gateway was asked to call out without credentials
    #[error("API Error: no API key configured")]
    MissingApiKey,
}

/// Outbound calls to the remote model.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send a prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Embed a text into a float vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError>;
}
