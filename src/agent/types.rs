//! Agent client seam: the service trait and its error type.
//!
//! Wire types live in the engine crate (`canvas::agent`) so the normalizer can
//! be tested without any I/O; this module adds the async boundary.

use canvas::agent::{AgentRequest, AgentResponse};

/// Errors produced by Agent Service calls.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// `AGENT_BASE_URL` is not set, so generation is disabled.
    #[error("agent not configured: AGENT_BASE_URL not set")]
    MissingBaseUrl,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request to the agent failed (connect, timeout, body read).
    #[error("agent request failed: {0}")]
    Request(String),

    /// The agent returned a non-success HTTP status.
    #[error("agent response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body was not a valid agent envelope.
    #[error("agent response parse failed: {0}")]
    Parse(String),

    /// The agent answered with `status: "error"`.
    #[error("agent rejected request: {0}")]
    Rejected(String),
}

impl AgentError {
    /// Whether retrying the same request could plausibly succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

/// Anything that can answer an [`AgentRequest`]. Mocked in tests.
#[async_trait::async_trait]
pub trait AgentService: Send + Sync {
    async fn send(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError>;

    /// Identifier sent as `agentId`.
    fn agent_id(&self) -> &str;
}
