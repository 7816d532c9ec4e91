use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tokio_util::io::ReaderStream;

use crate::domain::JobPhase;
use crate::presentation::handlers::status::StatusResponse;
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

/// Stream the finished artifact. A job that is still running answers 202
/// with its current status; a failed job answers 404 with its failure
/// reason so callers can tell it apart from an id that never existed.
#[tracing::instrument(skip(state))]
pub async fn file_handler(
    State(state): State<AppState>,
    Path(download_id): Path<String>,
) -> impl IntoResponse {
    let job = match super::parse_download_id(&download_id) {
        Some(id) => state.job_store.get(id).await,
        None => None,
    };
    let Some(job) = job else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Download not found: {}", download_id),
            }),
        )
            .into_response();
    };

    match job.phase {
        JobPhase::Failed => {
            let reason = job
                .failure_reason
                .as_deref()
                .unwrap_or("unknown failure");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Download failed: {}", reason),
                }),
            )
                .into_response()
        }
        JobPhase::Completed => stream_artifact(&state, &job).await,
        _ => (StatusCode::ACCEPTED, Json(StatusResponse::from_job(&job))).into_response(),
    }
}

async fn stream_artifact(
    _state: &AppState,
    job: &crate::domain::DownloadJob,
) -> axum::response::Response {
    let (Some(path), Some(size)) = (job.artifact_path.as_ref(), job.artifact_size) else {
        return missing_artifact();
    };

    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        // The janitor can reap the artifact while the record lingers.
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Artifact missing on disk");
            return missing_artifact();
        }
    };

    let filename = format!("{}.{}", job.id, job.format);
    let body = Body::from_stream(ReaderStream::new(file));

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(job.format.mime_type()),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    response
}

fn missing_artifact() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Artifact no longer available".to_string(),
        }),
    )
        .into_response()
}
