mod download_id;
mod download_job;
mod job_phase;
mod media_format;

pub use download_id::DownloadId;
pub use download_job::DownloadJob;
pub use job_phase::JobPhase;
pub use media_format::{MediaFormat, MEDIA_EXTENSIONS};
