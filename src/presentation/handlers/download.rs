use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{DownloadJob, MediaFormat};
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadAccepted {
    pub success: bool,
    pub download_id: String,
    pub message: String,
    pub status_url: String,
    pub download_url: String,
}

/// Accept a download request, register the job, and kick off its pipeline
/// without awaiting it. Validation failures never create a job.
#[tracing::instrument(skip(state, request))]
pub async fn download_handler(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> impl IntoResponse {
    let source_url = match request.source_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "sourceUrl is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    let format = match request.format.as_deref() {
        None | Some("") => MediaFormat::default(),
        Some(raw) => match raw.parse::<MediaFormat>() {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(format = %raw, "Rejected download request");
                return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })).into_response();
            }
        },
    };

    let job = DownloadJob::new(source_url, format, request.title);
    let id = job.id;

    if let Err(e) = state.job_store.create(job.clone()).await {
        tracing::error!(error = %e, "Failed to register job");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to register job: {}", e),
            }),
        )
            .into_response();
    }

    state.orchestrator.spawn_job(job);

    tracing::info!(job_id = %id, format = %format, "Download job accepted");

    (
        StatusCode::OK,
        Json(DownloadAccepted {
            success: true,
            download_id: id.to_string(),
            message: "Download started".to_string(),
            status_url: format!("/status/{}", id),
            download_url: format!("/file/{}", id),
        }),
    )
        .into_response()
}
