//! Generation workflow: ask the agent for a diagram and apply it to a project.
//!
//! DESIGN
//! ======
//! The agent call is the only slow, fallible step, so the project is never
//! locked across it. A per-project in-flight mark (see
//! [`AppState::try_begin_generation`]) rejects a second request; it is held
//! by a guard and released on every exit path. The stored project is reloaded
//! after the call and the result applied as one replace of nodes,
//! connections and status. Manual edits made while the call was in flight
//! are overwritten, not merged.
//!
//! ERROR HANDLING
//! ==============
//! Precondition failures (missing project, blank requirements, generation
//! already running, no agent configured) return before anything is written.
//! An agent failure restores the status the project had before generation
//! began and applies no data. So does a store failure while the generated
//! diagram is written back.

use canvas::agent::{AgentRequest, build_generation_prompt, fallback_diagram, normalize};
use canvas::doc::{DiagramPayload, Project, ProjectStatus};
use tracing::{info, warn};

use crate::agent::AgentError;
use crate::services::project::{self, ProjectError};
use crate::services::store::ProjectStore;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("project has no requirements to generate from")]
    EmptyRequirements,
    #[error("a generation is already running for this project")]
    AlreadyGenerating,
    #[error("no agent is configured")]
    AgentUnavailable,
    #[error("agent call failed: {0}")]
    AgentFailed(#[source] AgentError),
    #[error(transparent)]
    Project(ProjectError),
}

impl From<ProjectError> for GenerateError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(id) => Self::NotFound(id),
            other => Self::Project(other),
        }
    }
}

/// A completed generation.
#[derive(Debug)]
pub struct Generation {
    /// The project as stored after the diagram was applied.
    pub project: Project,
    /// Follow-up ideas returned by the agent, if any.
    pub suggestions: Vec<String>,
}

/// Run the full generation workflow for `project_id`.
///
/// # Errors
///
/// See [`GenerateError`]. When the agent call or the final write fails, the
/// project's prior status has already been restored.
pub async fn generate_diagram(state: &AppState, project_id: &str) -> Result<Generation, GenerateError> {
    let store = state.store.as_ref();
    let mut project = project::require_project(store, project_id).await?;
    if project.requirements.trim().is_empty() {
        return Err(GenerateError::EmptyRequirements);
    }

    let _guard = state
        .try_begin_generation(project_id)
        .ok_or(GenerateError::AlreadyGenerating)?;

    let Some(agent) = state.agent.clone() else {
        return Err(GenerateError::AgentUnavailable);
    };

    if project.status == ProjectStatus::Generating {
        // Nothing is in flight (we hold the mark), so this was left by an interrupted run.
        warn!(%project_id, "clearing stale generating status");
        project.abort_generation(ProjectStatus::Draft);
    }
    let previous = project
        .begin_generation()
        .map_err(|e| GenerateError::Project(ProjectError::Invalid(e)))?;
    let request = AgentRequest {
        message: build_generation_prompt(&project.requirements, project.audience),
        agent_id: agent.agent_id().to_owned(),
    };
    project::save_project(store, project).await?;
    info!(%project_id, agent_id = %request.agent_id, "generation started");

    let response = match agent.send(&request).await {
        Ok(resp) if resp.is_success() => resp,
        Ok(resp) => {
            let err = AgentError::Rejected(format!("status {}", resp.status));
            return Err(abort_generation(store, project_id, previous, err).await);
        }
        Err(e) => return Err(abort_generation(store, project_id, previous, e).await),
    };

    let payload = normalize(&response);
    let saved = match apply_payload(store, project_id, payload).await {
        Ok(saved) => saved,
        Err(e) => {
            warn!(%project_id, error = %e, "storing generated diagram failed");
            restore_status(store, project_id, previous).await;
            return Err(e.into());
        }
    };
    info!(
        %project_id,
        nodes = saved.nodes.len(),
        connections = saved.connections.len(),
        "generation completed"
    );

    Ok(Generation { project: saved, suggestions: response.result.suggestions })
}

/// Reload the latest stored project and replace its diagram with `payload`.
async fn apply_payload(
    store: &dyn ProjectStore,
    project_id: &str,
    payload: DiagramPayload,
) -> Result<Project, ProjectError> {
    let mut latest = project::require_project(store, project_id).await?;
    latest.complete_generation(payload);
    if let Err(e) = latest.validate() {
        warn!(%project_id, error = %e, "agent diagram violates model invariants; using fallback");
        latest.complete_generation(fallback_diagram());
    }
    project::save_project(store, latest).await
}

/// Put the prior status back after a failed agent call. No diagram data is applied.
async fn abort_generation(
    store: &dyn ProjectStore,
    project_id: &str,
    previous: ProjectStatus,
    err: AgentError,
) -> GenerateError {
    warn!(%project_id, error = %err, "generation failed");
    restore_status(store, project_id, previous).await;
    GenerateError::AgentFailed(err)
}

/// Best effort: reload and write back `previous` as the project status.
async fn restore_status(store: &dyn ProjectStore, project_id: &str, previous: ProjectStatus) {
    match project::require_project(store, project_id).await {
        Ok(mut latest) => {
            latest.abort_generation(previous);
            if let Err(e) = project::save_project(store, latest).await {
                warn!(%project_id, error = %e, "failed to restore status after generation failure");
            }
        }
        Err(e) => warn!(%project_id, error = %e, "project unavailable after generation failure"),
    }
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
