use std::sync::Arc;

use crate::infrastructure::status::StatusStore;
use crate::workers::transcoder::JobOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub status: Arc<dyn StatusStore>,
    pub orchestrator: Arc<JobOrchestrator>,
}

impl AppState {
    pub fn new(status: Arc<dyn StatusStore>, orchestrator: JobOrchestrator) -> Self {
        Self {
            status,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
