//! Persistence backends for whole projects.
//!
//! DESIGN
//! ======
//! A project is stored and loaded as one JSON document. `save` overwrites the
//! whole document: there is no partial-field update and no concurrency
//! token, so two writers to the same id clobber each other and the last one
//! wins. Timestamps are owned by the façade in `services::project`; stores
//! persist what they are given.

use std::collections::HashMap;

use canvas::doc::Project;
use sqlx::PgPool;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored project is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Whole-document project storage.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// The project with `id`, or `None` if there is none.
    async fn load(&self, id: &str) -> Result<Option<Project>, StoreError>;
    /// Insert or overwrite by `project.id`.
    async fn save(&self, project: &Project) -> Result<(), StoreError>;
    /// Every stored project, in no particular order.
    async fn list(&self) -> Result<Vec<Project>, StoreError>;
    /// Remove `id`. Removing a missing id succeeds.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, Project>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProjectStore for MemoryStore {
    async fn load(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.read().await.get(id).cloned())
    }

    async fn save(&self, project: &Project) -> Result<(), StoreError> {
        self.projects
            .write()
            .await
            .insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.projects.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.projects.write().await.remove(id);
        Ok(())
    }
}

// =============================================================================
// POSTGRES
// =============================================================================

/// `projects(id, data, updated_at)` table, one JSONB document per row.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProjectStore for PgStore {
    async fn load(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, (serde_json::Value,)>("SELECT data FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some((data,)) => Ok(Some(serde_json::from_value(data)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, project: &Project) -> Result<(), StoreError> {
        let data = serde_json::to_value(project)?;
        sqlx::query(
            "INSERT INTO projects (id, data, updated_at) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at",
        )
        .bind(&project.id)
        .bind(data)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, (String, serde_json::Value)>("SELECT id, data FROM projects ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await?;
        let mut projects = Vec::with_capacity(rows.len());
        for (id, data) in rows {
            match serde_json::from_value::<Project>(data) {
                Ok(project) => projects.push(project),
                Err(e) => tracing::warn!(%id, error = %e, "skipping undecodable project row"),
            }
        }
        Ok(projects)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
