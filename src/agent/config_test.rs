use super::*;

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_agent_env() {
    unsafe {
        std::env::remove_var("AGENT_BASE_URL");
        std::env::remove_var("AGENT_ID");
        std::env::remove_var("AGENT_API_KEY_ENV");
        std::env::remove_var("AGENT_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("AGENT_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("TEST_AGENT_KEY");
    }
}

#[test]
fn from_env_requires_base_url() {
    unsafe { clear_agent_env() };

    let err = AgentConfig::from_env().unwrap_err();
    assert!(matches!(err, AgentError::MissingBaseUrl));
}

#[test]
fn from_env_defaults() {
    unsafe {
        clear_agent_env();
        std::env::set_var("AGENT_BASE_URL", "http://agents.internal:8000/");
    }

    let cfg = AgentConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "http://agents.internal:8000");
    assert_eq!(cfg.chat_url(), "http://agents.internal:8000/chat");
    assert_eq!(cfg.agent_id, DEFAULT_AGENT_ID);
    assert!(cfg.api_key.is_none());
    assert_eq!(
        cfg.timeouts,
        AgentTimeouts {
            request_secs: DEFAULT_AGENT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_AGENT_CONNECT_TIMEOUT_SECS
        }
    );

    unsafe { clear_agent_env() };
}

#[test]
fn from_env_reads_overrides() {
    unsafe {
        clear_agent_env();
        std::env::set_var("AGENT_BASE_URL", "https://agents.example.test");
        std::env::set_var("AGENT_ID", "solution-architect");
        std::env::set_var("AGENT_API_KEY_ENV", "TEST_AGENT_KEY");
        std::env::set_var("TEST_AGENT_KEY", "tok-123");
        std::env::set_var("AGENT_REQUEST_TIMEOUT_SECS", "30");
        std::env::set_var("AGENT_CONNECT_TIMEOUT_SECS", "3");
    }

    let cfg = AgentConfig::from_env().unwrap();
    assert_eq!(cfg.agent_id, "solution-architect");
    assert_eq!(cfg.api_key.as_deref(), Some("tok-123"));
    assert_eq!(cfg.timeouts, AgentTimeouts { request_secs: 30, connect_secs: 3 });

    unsafe { clear_agent_env() };
}

#[test]
fn from_env_rejects_non_http_base_url() {
    unsafe {
        clear_agent_env();
        std::env::set_var("AGENT_BASE_URL", "agents.internal");
    }

    let err = AgentConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("must be http(s)"));

    unsafe { clear_agent_env() };
}

#[test]
fn from_env_errors_when_key_var_unset() {
    unsafe {
        clear_agent_env();
        std::env::set_var("AGENT_BASE_URL", "http://localhost:8000");
        std::env::set_var("AGENT_API_KEY_ENV", "TEST_AGENT_KEY");
    }

    let err = AgentConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("TEST_AGENT_KEY"));

    unsafe { clear_agent_env() };
}
