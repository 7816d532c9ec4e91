use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::{DownloadId, JobPhase, MediaFormat};

/// One user-requested conversion/download, tracked from acceptance to a
/// terminal phase. Mutated only by the orchestrator and the materializer;
/// the HTTP surface reads snapshots out of the store.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: DownloadId,
    pub source_url: String,
    pub format: MediaFormat,
    pub title: Option<String>,
    pub phase: JobPhase,
    pub progress_percent: u8,
    pub message: String,
    pub artifact_path: Option<PathBuf>,
    pub artifact_size: Option<u64>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DownloadJob {
    pub fn new(source_url: String, format: MediaFormat, title: Option<String>) -> Self {
        Self {
            id: DownloadId::new(),
            source_url,
            format,
            title,
            phase: JobPhase::Queued,
            progress_percent: JobPhase::Queued.progress_percent(),
            message: JobPhase::Queued.message().to_string(),
            artifact_path: None,
            artifact_size: None,
            failure_reason: None,
            created_at: Utc::now(),
        }
    }

    /// Move to `phase` if it is a forward step in the state machine.
    /// Regressions and transitions out of a terminal phase are ignored,
    /// so a late writer can never rewind an already-settled job.
    pub fn advance(&mut self, phase: JobPhase) -> bool {
        if self.phase.is_terminal() || phase.rank() <= self.phase.rank() {
            return false;
        }
        self.phase = phase;
        self.progress_percent = phase.progress_percent();
        self.message = phase.message().to_string();
        true
    }

    pub fn complete(&mut self, artifact_path: PathBuf, artifact_size: u64) {
        if self.advance(JobPhase::Completed) {
            self.artifact_path = Some(artifact_path);
            self.artifact_size = Some(artifact_size);
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.advance(JobPhase::Failed) {
            self.failure_reason = Some(reason.into());
            self.message = JobPhase::Failed.message().to_string();
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> DownloadJob {
        DownloadJob::new("https://example.com/v1".to_string(), MediaFormat::Mp4, None)
    }

    #[test]
    fn advance_walks_forward_only() {
        let mut j = job();
        assert!(j.advance(JobPhase::Navigating));
        assert!(j.advance(JobPhase::Submitting));
        assert!(!j.advance(JobPhase::Navigating));
        assert_eq!(j.phase, JobPhase::Submitting);
    }

    #[test]
    fn terminal_phases_are_sticky() {
        let mut j = job();
        j.fail("navigation timed out");
        assert!(!j.advance(JobPhase::Materializing));
        assert_eq!(j.phase, JobPhase::Failed);
        assert_eq!(j.failure_reason.as_deref(), Some("navigation timed out"));

        let mut j = job();
        j.complete(PathBuf::from("/tmp/x.mp4"), 1024);
        j.fail("too late");
        assert_eq!(j.phase, JobPhase::Completed);
        assert!(j.failure_reason.is_none());
    }

    #[test]
    fn completion_records_artifact() {
        let mut j = job();
        j.advance(JobPhase::Materializing);
        j.complete(PathBuf::from("/out/a.mp4"), 4096);
        assert_eq!(j.artifact_size, Some(4096));
        assert_eq!(j.progress_percent, 100);
    }

    #[test]
    fn failed_is_reachable_from_any_non_terminal_phase() {
        for phase in [JobPhase::Queued, JobPhase::Navigating, JobPhase::AwaitingTransfer] {
            let mut j = job();
            j.advance(phase);
            j.fail("boom");
            assert_eq!(j.phase, JobPhase::Failed);
        }
    }
}
