//! Shared handler state.

use pitchside_scheduler::Scheduler;
use pitchside_scraper::Orchestrator;
use std::sync::Arc;

/// State cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    /// TTL-gated read path
    pub orchestrator: Arc<Orchestrator>,
    /// Background refresh loop, reported by `/health`
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, scheduler: Arc<Scheduler>) -> Self {
        Self {
            orchestrator,
            scheduler,
        }
    }
}
