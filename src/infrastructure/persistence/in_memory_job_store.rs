use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{JobMutator, JobStore, StoreError};
use crate::domain::{DownloadId, DownloadJob};

/// Process-lifetime job state. The outer map lock is held only for
/// lookups and membership changes; each job carries its own lock, so
/// writers to different jobs proceed in parallel while writes to one job
/// are serialized.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<DownloadId, Arc<RwLock<DownloadJob>>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: DownloadJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(StoreError::DuplicateId(job.id));
        }
        jobs.insert(job.id, Arc::new(RwLock::new(job)));
        Ok(())
    }

    async fn get(&self, id: DownloadId) -> Option<DownloadJob> {
        let entry = self.jobs.read().await.get(&id).cloned()?;
        let job = entry.read().await;
        Some(job.clone())
    }

    async fn update(&self, id: DownloadId, mutate: JobMutator) -> Result<(), StoreError> {
        let entry = self
            .jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;
        let mut job = entry.write().await;
        mutate(&mut job);
        Ok(())
    }

    async fn list(&self) -> Vec<DownloadJob> {
        let entries: Vec<_> = self.jobs.read().await.values().cloned().collect();
        let mut snapshot = Vec::with_capacity(entries.len());
        for entry in entries {
            snapshot.push(entry.read().await.clone());
        }
        snapshot
    }

    async fn remove(&self, id: DownloadId) -> Option<DownloadJob> {
        let entry = self.jobs.write().await.remove(&id)?;
        let job = entry.read().await;
        Some(job.clone())
    }
}
