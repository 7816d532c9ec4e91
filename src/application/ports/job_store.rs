use async_trait::async_trait;

use crate::domain::{DownloadId, DownloadJob};

/// Atomic in-place transformation applied under the job's own lock.
pub type JobMutator = Box<dyn FnOnce(&mut DownloadJob) + Send>;

/// In-memory job state shared between the HTTP surface, the orchestrator
/// and the janitor. Implementations must serialize writes per job id while
/// letting different jobs be mutated in parallel. Contents are
/// process-lifetime only; durability is an explicit non-goal.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Register a freshly accepted job. The id is generated by the caller;
    /// an already-known id is rejected.
    async fn create(&self, job: DownloadJob) -> Result<(), StoreError>;

    /// Snapshot of a single job.
    async fn get(&self, id: DownloadId) -> Option<DownloadJob>;

    /// Apply `mutate` atomically to the job's record.
    async fn update(&self, id: DownloadId, mutate: JobMutator) -> Result<(), StoreError>;

    /// Snapshot of all jobs, in no particular order.
    async fn list(&self) -> Vec<DownloadJob>;

    /// Drop the job record. The janitor is the only intended caller; this
    /// is the destruction point of a job's lifecycle.
    async fn remove(&self, id: DownloadId) -> Option<DownloadJob>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate job id: {0}")]
    DuplicateId(DownloadId),
    #[error("job not found: {0}")]
    NotFound(DownloadId),
}
