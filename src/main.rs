mod agent;
mod config;
mod db;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::agent::{AgentClient, AgentError, AgentService};
use crate::config::AppConfig;
use crate::services::store::{MemoryStore, PgStore, ProjectStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to read .env");
        }
    }

    let config = AppConfig::from_env()?;

    let store: Arc<dyn ProjectStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections).await?;
            tracing::info!(max_connections = config.db_max_connections, "postgres project store ready");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; projects are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let agent: Option<Arc<dyn AgentService>> = match AgentClient::from_env() {
        Ok(client) => {
            tracing::info!(url = client.chat_url(), agent_id = client.agent_id(), "agent client initialized");
            Some(Arc::new(client))
        }
        Err(AgentError::MissingBaseUrl) => {
            tracing::warn!("AGENT_BASE_URL not set; diagram generation disabled");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "agent client not configured; diagram generation disabled");
            None
        }
    };

    let state = state::AppState::new(store, agent);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "archsketch listening");
    axum::serve(listener, app).await?;
    Ok(())
}
