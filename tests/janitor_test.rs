use std::sync::Arc;
use std::time::Duration;

use clipfetch::application::ports::JobStore;
use clipfetch::application::services::Janitor;
use clipfetch::domain::{DownloadJob, MediaFormat};
use clipfetch::infrastructure::persistence::InMemoryJobStore;

fn janitor(dir: &std::path::Path, retention: Duration, store: Arc<InMemoryJobStore>) -> Janitor {
    Janitor::new(dir.to_path_buf(), retention, Duration::from_secs(300), store)
}

#[tokio::test]
async fn given_expired_file_when_sweeping_then_it_is_deleted() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(InMemoryJobStore::new());
    std::fs::write(dir.path().join("expired.mp4"), b"old artifact").unwrap();
    std::thread::sleep(Duration::from_millis(60));

    janitor(dir.path(), Duration::from_millis(20), store)
        .sweep_once()
        .await
        .unwrap();

    assert!(!dir.path().join("expired.mp4").exists());
}

#[tokio::test]
async fn given_fresh_file_when_sweeping_then_it_is_kept() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(InMemoryJobStore::new());
    std::fs::write(dir.path().join("fresh.mp4"), b"new artifact").unwrap();

    janitor(dir.path(), Duration::from_secs(3600), store)
        .sweep_once()
        .await
        .unwrap();

    assert!(dir.path().join("fresh.mp4").exists());
}

#[tokio::test]
async fn given_mixed_ages_when_sweeping_then_only_expired_files_go() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(InMemoryJobStore::new());
    std::fs::write(dir.path().join("old.mp4"), b"old").unwrap();
    std::thread::sleep(Duration::from_millis(80));
    std::fs::write(dir.path().join("new.mp4"), b"new").unwrap();

    janitor(dir.path(), Duration::from_millis(40), store)
        .sweep_once()
        .await
        .unwrap();

    assert!(!dir.path().join("old.mp4").exists());
    assert!(dir.path().join("new.mp4").exists());
}

#[tokio::test]
async fn given_expired_job_record_when_sweeping_then_store_entry_is_removed() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(InMemoryJobStore::new());

    let mut expired = DownloadJob::new("https://example.com/v".to_string(), MediaFormat::Mp4, None);
    expired.created_at = chrono::Utc::now() - chrono::Duration::hours(2);
    let expired_id = expired.id;
    store.create(expired).await.unwrap();

    let fresh = DownloadJob::new("https://example.com/w".to_string(), MediaFormat::Mp4, None);
    let fresh_id = fresh.id;
    store.create(fresh).await.unwrap();

    janitor(dir.path(), Duration::from_secs(3600), store.clone())
        .sweep_once()
        .await
        .unwrap();

    assert!(store.get(expired_id).await.is_none());
    assert!(store.get(fresh_id).await.is_some());
}

#[tokio::test]
async fn given_expired_file_of_inflight_job_when_sweeping_then_it_is_still_deleted() {
    // Eviction is purely time-based; job phase is deliberately ignored.
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(InMemoryJobStore::new());
    let job = DownloadJob::new("https://example.com/v".to_string(), MediaFormat::Mp4, None);
    let name = format!("{}.mp4", job.id);
    store.create(job).await.unwrap();

    std::fs::write(dir.path().join(&name), b"slow job's partial file").unwrap();
    std::thread::sleep(Duration::from_millis(60));

    janitor(dir.path(), Duration::from_millis(20), store)
        .sweep_once()
        .await
        .unwrap();

    assert!(!dir.path().join(&name).exists());
}
