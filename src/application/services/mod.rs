mod janitor;
mod locator;
mod materializer;
mod orchestrator;

pub use janitor::Janitor;
pub use locator::{LocatorPolicy, DOWNLOAD_KEYWORDS};
pub use materializer::{Artifact, MaterializeError, Materializer};
pub use orchestrator::{DownloadOrchestrator, OrchestratorConfig};
