use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::Utc;

use crate::application::ports::JobStore;

/// Periodic sweep that evicts stale output files and forgotten job
/// records. Eviction is purely time-based: a file older than the
/// retention window is removed without consulting any job's phase, which
/// means a pathologically slow job can in principle lose its
/// partially-written file. That is an accepted limitation.
pub struct Janitor {
    output_dir: PathBuf,
    retention: Duration,
    interval: Duration,
    store: Arc<dyn JobStore>,
}

impl Janitor {
    pub fn new(
        output_dir: PathBuf,
        retention: Duration,
        interval: Duration,
        store: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            output_dir,
            retention,
            interval,
            store,
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(self.interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so startup does
            // not race the output directory creation.
            tick.tick().await;
            loop {
                tick.tick().await;
                if let Err(e) = self.sweep_once().await {
                    tracing::warn!(error = %e, "Janitor sweep failed");
                }
            }
        })
    }

    /// One sweep: delete expired files, then drop expired job records.
    pub async fn sweep_once(&self) -> std::io::Result<()> {
        let removed_files = self.sweep_files().await?;
        let removed_jobs = self.sweep_jobs().await;
        if removed_files > 0 || removed_jobs > 0 {
            tracing::info!(removed_files, removed_jobs, "Janitor sweep complete");
        }
        Ok(())
    }

    async fn sweep_files(&self) -> std::io::Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;

        let mut entries = tokio::fs::read_dir(&self.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let expired = meta
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .map(|age| age > self.retention)
                .unwrap_or(false);
            if !expired {
                continue;
            }
            // The materializer may have renamed it away mid-sweep.
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::debug!(path = %entry.path().display(), "Reaped stale file");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Failed to reap file");
                }
            }
        }

        Ok(removed)
    }

    async fn sweep_jobs(&self) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.retention).unwrap_or(chrono::Duration::zero());
        let mut removed = 0;
        for job in self.store.list().await {
            if job.created_at < cutoff && self.store.remove(job.id).await.is_some() {
                tracing::debug!(job_id = %job.id, "Reaped expired job record");
                removed += 1;
            }
        }
        removed
    }
}
