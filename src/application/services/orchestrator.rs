use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{BrowserDriver, BrowserSession, DriverError, JobStore, TransferSignal};
use crate::application::services::{Materializer, MaterializeError};
use crate::domain::{DownloadId, DownloadJob, JobPhase};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// The fixed third-party conversion page every job is driven through.
    pub conversion_page_url: String,
    /// Hard ceiling on one job's whole pipeline.
    pub job_timeout: Duration,
    /// Where failure screenshots and element dumps are persisted.
    pub debug_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum JobError {
    #[error("{0}")]
    Driver(#[from] DriverError),
    #[error("{0}")]
    Materialize(#[from] MaterializeError),
}

/// Sequences one job through the state machine: browser automation first,
/// then materialization, updating the store at each phase boundary. Every
/// job runs as its own fire-and-forget task; a failure is contained in
/// that job's record and never crosses to other jobs or the server.
pub struct DownloadOrchestrator {
    store: Arc<dyn JobStore>,
    driver: Arc<dyn BrowserDriver>,
    materializer: Materializer,
    config: OrchestratorConfig,
}

impl DownloadOrchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        driver: Arc<dyn BrowserDriver>,
        materializer: Materializer,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            driver,
            materializer,
            config,
        }
    }

    /// Start the job's pipeline without awaiting it. The accepting request
    /// returns immediately; progress is observable only through the store.
    pub fn spawn_job(self: &Arc<Self>, job: DownloadJob) {
        let this = Arc::clone(self);
        let id = job.id;
        let timeout = this.config.job_timeout;
        tokio::spawn(async move {
            let span = tracing::info_span!("download_job", job_id = %id);
            let _guard = span.enter();

            match tokio::time::timeout(timeout, this.run_job(&job)).await {
                Ok(Ok(())) => tracing::info!("Download job completed"),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Download job failed");
                    this.fail(id, e.to_string()).await;
                }
                Err(_) => {
                    tracing::warn!(timeout_secs = timeout.as_secs(), "Download job timed out");
                    this.fail(id, format!("job exceeded the {}s limit", timeout.as_secs())).await;
                }
            }
        });
    }

    async fn run_job(&self, job: &DownloadJob) -> Result<(), JobError> {
        self.automate(job).await?;

        self.advance(job.id, JobPhase::Materializing).await;
        let artifact = self.materializer.materialize(job.id, job.format).await?;

        if let Err(e) = self
            .store
            .update(
                job.id,
                Box::new(move |j| j.complete(artifact.path, artifact.size)),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to record job completion");
        }
        Ok(())
    }

    /// Drive the browser through the conversion page. The session is
    /// closed on every path out of this function; the chromium adapter
    /// additionally reaps its child process on drop should the outer job
    /// timeout cancel us mid-step.
    async fn automate(&self, job: &DownloadJob) -> Result<(), DriverError> {
        let mut session = self.driver.open_session(job.id).await?;
        let result = self.drive_page(session.as_mut(), job).await;

        if let Err(e) = &result {
            if e.warrants_debug_capture() {
                self.persist_debug_capture(session.as_mut(), job.id).await;
            }
        }
        session.close().await;
        result
    }

    async fn drive_page(
        &self,
        session: &mut dyn BrowserSession,
        job: &DownloadJob,
    ) -> Result<(), DriverError> {
        self.advance(job.id, JobPhase::Navigating).await;
        session.navigate(&self.config.conversion_page_url).await?;

        self.advance(job.id, JobPhase::FillingInput).await;
        session.fill_source_url(&job.source_url).await?;

        self.advance(job.id, JobPhase::Submitting).await;
        session.submit().await?;

        self.advance(job.id, JobPhase::AwaitingTransfer).await;
        match session.await_transfer().await? {
            TransferSignal::MediaResponse { url, content_type } => {
                tracing::debug!(url = %url, content_type = ?content_type, "Media response observed");
            }
            TransferSignal::SettleTimeout => {
                tracing::debug!("No media response observed; falling back to directory scan");
            }
        }
        Ok(())
    }

    async fn persist_debug_capture(&self, session: &mut dyn BrowserSession, id: DownloadId) {
        let capture = match session.capture_debug().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Debug capture failed");
                return;
            }
        };

        let png_path = self.config.debug_dir.join(format!("{}_debug.png", id));
        if let Err(e) = tokio::fs::write(&png_path, &capture.screenshot_png).await {
            tracing::warn!(error = %e, "Failed to write debug screenshot");
        }

        match serde_json::to_vec_pretty(&capture.elements) {
            Ok(json) => {
                let dump_path = self.config.debug_dir.join(format!("{}_elements.json", id));
                if let Err(e) = tokio::fs::write(&dump_path, json).await {
                    tracing::warn!(error = %e, "Failed to write element dump");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize element dump"),
        }
    }

    async fn advance(&self, id: DownloadId, phase: JobPhase) {
        tracing::debug!(phase = %phase, "Phase transition");
        if let Err(e) = self
            .store
            .update(id, Box::new(move |j| {
                j.advance(phase);
            }))
            .await
        {
            tracing::warn!(error = %e, "Failed to record phase transition");
        }
    }

    async fn fail(&self, id: DownloadId, reason: String) {
        if let Err(e) = self
            .store
            .update(id, Box::new(move |j| j.fail(reason)))
            .await
        {
            tracing::warn!(error = %e, "Failed to record job failure");
        }
    }
}
