use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::domain::{DownloadJob, JobPhase};
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub download_id: String,
    pub phase: String,
    pub progress_percent: u8,
    pub message: String,
    pub source_url: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl StatusResponse {
    pub fn from_job(job: &DownloadJob) -> Self {
        let completed = job.phase == JobPhase::Completed;
        Self {
            download_id: job.id.to_string(),
            phase: job.phase.to_string(),
            progress_percent: job.progress_percent,
            message: job.message.clone(),
            source_url: job.source_url.clone(),
            format: job.format.to_string(),
            title: job.title.clone(),
            created_at: job.created_at.to_rfc3339(),
            artifact_size: job.artifact_size,
            download_url: completed.then(|| format!("/file/{}", job.id)),
            failure_reason: job.failure_reason.clone(),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn status_handler(
    State(state): State<AppState>,
    Path(download_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = super::parse_download_id(&download_id) else {
        return not_found(&download_id);
    };

    match state.job_store.get(id).await {
        Some(job) => (StatusCode::OK, Json(StatusResponse::from_job(&job))).into_response(),
        None => not_found(&download_id),
    }
}

fn not_found(download_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Download not found: {}", download_id),
        }),
    )
        .into_response()
}
