use std::sync::Arc;

use crate::application::ports::JobStore;
use crate::application::services::DownloadOrchestrator;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub job_store: Arc<dyn JobStore>,
    pub orchestrator: Arc<DownloadOrchestrator>,
    pub settings: Settings,
}
