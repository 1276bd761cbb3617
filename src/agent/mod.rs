//! Agent Service client: proposes whole diagrams from requirements text.
//!
//! DESIGN
//! ======
//! A thin HTTP wrapper around the agent's `/chat` endpoint. Everything that
//! does not need the network (envelope parsing, status interpretation) is in
//! the pure `parse_response` so it can be tested directly. Callers depend on
//! the [`AgentService`] trait, never on `AgentClient`, so tests substitute a
//! mock.

pub mod config;
pub mod types;

use std::time::Duration;

use canvas::agent::{AgentRequest, AgentResponse};
use config::AgentConfig;
pub use types::{AgentError, AgentService};

// =============================================================================
// CLIENT
// =============================================================================

pub struct AgentClient {
    http: reqwest::Client,
    chat_url: String,
    agent_id: String,
    api_key: Option<String>,
}

impl AgentClient {
    /// Build an agent client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `AGENT_BASE_URL` is missing or invalid, or the HTTP client fails.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_config(AgentConfig::from_env()?)
    }

    /// Build an agent client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: AgentConfig) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| AgentError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, chat_url: config.chat_url(), agent_id: config.agent_id, api_key: config.api_key })
    }

    #[must_use]
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    async fn send_inner(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError> {
        let mut builder = self.http.post(&self.chat_url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AgentError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(AgentError::Response { status, body: text });
        }

        parse_response(&text)
    }
}

#[async_trait::async_trait]
impl AgentService for AgentClient {
    async fn send(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError> {
        let result = self.send_inner(request).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, retryable = e.retryable(), url = %self.chat_url, "agent call failed");
        }
        result
    }

    fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

/// Parse a 2xx response body into an envelope, surfacing `status: "error"` as [`AgentError::Rejected`].
fn parse_response(body: &str) -> Result<AgentResponse, AgentError> {
    let envelope: AgentResponse = serde_json::from_str(body).map_err(|e| AgentError::Parse(e.to_string()))?;
    if !envelope.is_success() {
        let message = if envelope.result.response.trim().is_empty() {
            format!("status {}", envelope.status)
        } else {
            envelope.result.response
        };
        return Err(AgentError::Rejected(message));
    }
    Ok(envelope)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
