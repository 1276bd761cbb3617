//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the project store, the optional agent client, and the set of project
//! ids with a generation in flight. The generation set is the only lock held
//! across an agent call, and it never guards project reads or writes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::agent::AgentService;
use crate::services::store::ProjectStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProjectStore>,
    /// Optional agent client. `None` if `AGENT_BASE_URL` is not configured.
    pub agent: Option<Arc<dyn AgentService>>,
    /// Project ids with a generation in flight.
    pub generating: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn ProjectStore>, agent: Option<Arc<dyn AgentService>>) -> Self {
        Self { store, agent, generating: Arc::new(Mutex::new(HashSet::new())) }
    }

    /// Mark `project_id` as generating. Returns `None` if it already is.
    ///
    /// The returned guard clears the mark when dropped, on every exit path.
    #[must_use]
    pub fn try_begin_generation(&self, project_id: &str) -> Option<GenerationGuard> {
        let mut set = self.generating.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(project_id.to_owned()) {
            return None;
        }
        Some(GenerationGuard { generating: Arc::clone(&self.generating), project_id: project_id.to_owned() })
    }

    #[must_use]
    pub fn is_generating(&self, project_id: &str) -> bool {
        self.generating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(project_id)
    }
}

/// Releases a project's in-flight generation mark on drop.
pub struct GenerationGuard {
    generating: Arc<Mutex<HashSet<String>>>,
    project_id: String,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.generating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.project_id);
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
