use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

/// Serve the full-page screenshot captured when the conversion page could
/// not be parsed for a job.
#[tracing::instrument(skip(state))]
pub async fn debug_artifact_handler(
    State(state): State<AppState>,
    Path(download_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = super::parse_download_id(&download_id) else {
        return not_found(&download_id);
    };

    let path = state
        .settings
        .downloads
        .output_dir
        .join(format!("{}_debug.png", id));

    match tokio::fs::read(&path).await {
        Ok(png) => {
            let mut response = (StatusCode::OK, png).into_response();
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
            response
        }
        Err(_) => not_found(&download_id),
    }
}

fn not_found(download_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("No debug artifact for: {}", download_id),
        }),
    )
        .into_response()
}
