//! Agent configuration parsed from environment variables.

use super::types::AgentError;
use crate::config::{env_parse, env_string};

pub const DEFAULT_AGENT_ID: &str = "architecture-designer";
pub const DEFAULT_AGENT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_AGENT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Service root without a trailing slash; requests go to `{base_url}/chat`.
    pub base_url: String,
    pub agent_id: String,
    /// Bearer token, when the deployment requires one.
    pub api_key: Option<String>,
    pub timeouts: AgentTimeouts,
}

impl AgentConfig {
    /// Build typed agent config from environment variables.
    ///
    /// Required:
    /// - `AGENT_BASE_URL`
    ///
    /// Optional:
    /// - `AGENT_ID`: default `architecture-designer`
    /// - `AGENT_API_KEY_ENV`: names the env var holding a bearer token
    /// - `AGENT_REQUEST_TIMEOUT_SECS`: default 120
    /// - `AGENT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or not http(s), or if
    /// `AGENT_API_KEY_ENV` names a variable that is not set.
    pub fn from_env() -> Result<Self, AgentError> {
        let base_url = env_string("AGENT_BASE_URL").ok_or(AgentError::MissingBaseUrl)?;
        let base_url = parse_base_url(&base_url)?;

        let agent_id = env_string("AGENT_ID").unwrap_or_else(|| DEFAULT_AGENT_ID.to_owned());
        let api_key = match env_string("AGENT_API_KEY_ENV") {
            Some(key_var) => Some(
                env_string(&key_var)
                    .ok_or_else(|| AgentError::ConfigParse(format!("AGENT_API_KEY_ENV names unset variable {key_var}")))?,
            ),
            None => None,
        };
        let timeouts = AgentTimeouts {
            request_secs: env_parse("AGENT_REQUEST_TIMEOUT_SECS", DEFAULT_AGENT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("AGENT_CONNECT_TIMEOUT_SECS", DEFAULT_AGENT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, agent_id, api_key, timeouts })
    }

    /// Full URL of the chat endpoint.
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

fn parse_base_url(raw: &str) -> Result<String, AgentError> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(AgentError::ConfigParse(format!("AGENT_BASE_URL must be http(s): {raw}")));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
