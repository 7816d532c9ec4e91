use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::presentation::handlers::status::StatusResponse;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct DownloadListResponse {
    pub total: usize,
    pub downloads: Vec<StatusResponse>,
}

#[tracing::instrument(skip(state))]
pub async fn list_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut jobs = state.job_store.list().await;
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let downloads: Vec<StatusResponse> = jobs.iter().map(StatusResponse::from_job).collect();
    (
        StatusCode::OK,
        Json(DownloadListResponse {
            total: downloads.len(),
            downloads,
        }),
    )
}
