mod debug_artifact;
mod download;
mod file;
mod health;
mod list;
pub mod status;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::DownloadId;

pub use debug_artifact::debug_artifact_handler;
pub use download::download_handler;
pub use file::file_handler;
pub use health::health_handler;
pub use list::list_handler;
pub use status::status_handler;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A path segment that is not a well-formed id can never match a job, so
/// callers treat `None` the same as an unknown id.
pub(crate) fn parse_download_id(raw: &str) -> Option<DownloadId> {
    Uuid::parse_str(raw).ok().map(DownloadId::from_uuid)
}
