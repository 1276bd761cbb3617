//! Project service: the persistence façade over a [`ProjectStore`].
//!
//! DESIGN
//! ======
//! Handlers and the generation workflow go through these functions rather
//! than the store so that timestamp rules live in one place: inserts stamp
//! `created_at = updated_at = now`, updates keep the stored `created_at` and
//! refresh `updated_at`. Reads used by listing degrade to empty results when
//! the store is unavailable so the dashboard still renders.

use canvas::doc::{Audience, ModelError, Project, ProjectVersion, now_ms};
use tracing::{info, warn};

use crate::services::store::{ProjectStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("invalid project: {0}")]
    Invalid(#[from] ModelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Create and store an empty draft project.
///
/// # Errors
///
/// Returns an error if the store write fails.
pub async fn create_project(
    store: &dyn ProjectStore,
    name: &str,
    requirements: &str,
    audience: Audience,
) -> Result<Project, ProjectError> {
    let name = if name.trim().is_empty() { "Untitled Project" } else { name.trim() };
    let project = Project::new(name, requirements, audience);
    store.save(&project).await?;
    info!(project_id = %project.id, name = %project.name, "project created");
    Ok(project)
}

/// Load a project. Missing ids and store failures both come back as `None`.
pub async fn get_project(store: &dyn ProjectStore, id: &str) -> Option<Project> {
    match store.load(id).await {
        Ok(project) => project,
        Err(e) => {
            warn!(project_id = %id, error = %e, "project load failed; reporting as absent");
            None
        }
    }
}

/// Load a project, distinguishing "missing" from store failure.
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn require_project(store: &dyn ProjectStore, id: &str) -> Result<Project, ProjectError> {
    store
        .load(id)
        .await?
        .ok_or_else(|| ProjectError::NotFound(id.to_owned()))
}

/// Upsert a whole project, applying the timestamp rules. Returns what was stored.
///
/// Snapshots are append-only: on update the stored `versions` are kept and
/// whatever the caller sent is ignored. Only [`create_version`] adds one.
///
/// # Errors
///
/// Returns `Invalid` if the project breaks a model invariant (nothing is
/// written), or the store error.
pub async fn save_project(store: &dyn ProjectStore, mut project: Project) -> Result<Project, ProjectError> {
    let created_at = match store.load(&project.id).await? {
        Some(existing) => {
            project.versions = existing.versions;
            Some(existing.created_at)
        }
        None => None,
    };
    write_project(store, project, created_at).await
}

/// Stamp timestamps and write `project` as given, versions included.
///
/// `created_at` is the stored creation time, or `None` for an insert.
async fn write_project(
    store: &dyn ProjectStore,
    mut project: Project,
    created_at: Option<i64>,
) -> Result<Project, ProjectError> {
    project.validate()?;
    let now = now_ms();
    project.created_at = created_at.unwrap_or(now);
    project.updated_at = now;
    store.save(&project).await?;
    info!(
        project_id = %project.id,
        nodes = project.nodes.len(),
        connections = project.connections.len(),
        "project saved"
    );
    Ok(project)
}

/// Every project, newest `updated_at` first. Store failure yields an empty list.
pub async fn list_projects(store: &dyn ProjectStore) -> Vec<Project> {
    match store.list().await {
        Ok(mut projects) => {
            projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            projects
        }
        Err(e) => {
            warn!(error = %e, "project list failed; returning empty list");
            Vec::new()
        }
    }
}

/// Delete a project. Deleting a missing id is not an error.
///
/// # Errors
///
/// Returns the store error.
pub async fn delete_project(store: &dyn ProjectStore, id: &str) -> Result<(), ProjectError> {
    store.delete(id).await?;
    info!(project_id = %id, "project deleted");
    Ok(())
}

/// Snapshot the live diagram as the next version and save.
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn create_version(
    store: &dyn ProjectStore,
    id: &str,
    snapshot_name: Option<String>,
) -> Result<ProjectVersion, ProjectError> {
    let mut project = require_project(store, id).await?;
    let version = project.snapshot(snapshot_name).clone();
    let created_at = project.created_at;
    write_project(store, project, Some(created_at)).await?;
    info!(project_id = %id, version = version.version, "version created");
    Ok(version)
}

/// The stored versions of a project, oldest first.
///
/// # Errors
///
/// Returns `NotFound` for a missing id, or the store error.
pub async fn list_versions(store: &dyn ProjectStore, id: &str) -> Result<Vec<ProjectVersion>, ProjectError> {
    Ok(require_project(store, id).await?.versions)
}

/// Copy a stored version back into the live diagram and save.
///
/// # Errors
///
/// Returns `NotFound` for a missing project, `Invalid(VersionNotFound)` for a
/// missing version, or the store error.
pub async fn restore_version(store: &dyn ProjectStore, id: &str, version: u32) -> Result<Project, ProjectError> {
    let mut project = require_project(store, id).await?;
    project.restore_version(version)?;
    let created_at = project.created_at;
    let saved = write_project(store, project, Some(created_at)).await?;
    info!(project_id = %id, version, "version restored");
    Ok(saved)
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
