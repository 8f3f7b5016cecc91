use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use anamnesis_interview::Orchestrator;
use anamnesis_storage::SessionStore;

use crate::error::ApiError;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Mutex<Orchestrator>>,
    /// Read-only snapshot queries go straight to the store.
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, store: Arc<dyn SessionStore>) -> Self {
        Self {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            store,
        }
    }

    /// Take the orchestrator, or fail with 409 while another action runs.
    pub fn orchestrator(&self) -> Result<MutexGuard<'_, Orchestrator>, ApiError> {
        self.orchestrator.try_lock().map_err(|_| ApiError::Busy)
    }
}
