use std::sync::Arc;

use clipfetch::application::ports::{JobStore, StoreError};
use clipfetch::domain::{DownloadId, DownloadJob, JobPhase, MediaFormat};
use clipfetch::infrastructure::persistence::InMemoryJobStore;

fn job(url: &str) -> DownloadJob {
    DownloadJob::new(url.to_string(), MediaFormat::Mp4, None)
}

#[tokio::test]
async fn given_new_job_when_creating_then_it_is_retrievable() {
    let store = InMemoryJobStore::new();
    let j = job("https://example.com/a");
    let id = j.id;

    store.create(j).await.unwrap();

    let fetched = store.get(id).await.unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.phase, JobPhase::Queued);
}

#[tokio::test]
async fn given_existing_id_when_creating_again_then_duplicate_is_rejected() {
    let store = InMemoryJobStore::new();
    let j = job("https://example.com/a");
    store.create(j.clone()).await.unwrap();

    let result = store.create(j).await;
    assert!(matches!(result, Err(StoreError::DuplicateId(_))));
}

#[tokio::test]
async fn given_unknown_id_when_getting_then_none_is_returned() {
    let store = InMemoryJobStore::new();
    assert!(store.get(DownloadId::new()).await.is_none());
}

#[tokio::test]
async fn given_unknown_id_when_updating_then_not_found_is_returned() {
    let store = InMemoryJobStore::new();
    let result = store
        .update(DownloadId::new(), Box::new(|j| j.fail("x")))
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn given_update_when_applied_then_mutation_is_atomic_and_visible() {
    let store = InMemoryJobStore::new();
    let j = job("https://example.com/a");
    let id = j.id;
    store.create(j).await.unwrap();

    store
        .update(id, Box::new(|j| {
            j.advance(JobPhase::Navigating);
        }))
        .await
        .unwrap();

    assert_eq!(store.get(id).await.unwrap().phase, JobPhase::Navigating);
}

#[tokio::test]
async fn given_two_jobs_when_updating_one_then_the_other_is_untouched() {
    let store = InMemoryJobStore::new();
    let a = job("https://example.com/a");
    let b = job("https://example.com/b");
    let (id_a, id_b) = (a.id, b.id);
    store.create(a).await.unwrap();
    store.create(b).await.unwrap();

    store
        .update(id_a, Box::new(|j| j.fail("a failed")))
        .await
        .unwrap();

    assert_eq!(store.get(id_a).await.unwrap().phase, JobPhase::Failed);
    assert_eq!(store.get(id_b).await.unwrap().phase, JobPhase::Queued);
}

#[tokio::test]
async fn given_concurrent_updates_to_different_jobs_then_both_apply() {
    let store = Arc::new(InMemoryJobStore::new());
    let a = job("https://example.com/a");
    let b = job("https://example.com/b");
    let (id_a, id_b) = (a.id, b.id);
    store.create(a).await.unwrap();
    store.create(b).await.unwrap();

    let (ra, rb) = tokio::join!(
        store.update(id_a, Box::new(|j| {
            j.advance(JobPhase::Navigating);
        })),
        store.update(id_b, Box::new(|j| {
            j.advance(JobPhase::Navigating);
        })),
    );
    ra.unwrap();
    rb.unwrap();

    assert_eq!(store.get(id_a).await.unwrap().phase, JobPhase::Navigating);
    assert_eq!(store.get(id_b).await.unwrap().phase, JobPhase::Navigating);
}

#[tokio::test]
async fn given_jobs_when_listing_then_snapshot_contains_all() {
    let store = InMemoryJobStore::new();
    for i in 0..3 {
        store.create(job(&format!("https://example.com/{i}"))).await.unwrap();
    }
    assert_eq!(store.list().await.len(), 3);
}

#[tokio::test]
async fn given_removed_job_when_getting_then_none_is_returned() {
    let store = InMemoryJobStore::new();
    let j = job("https://example.com/a");
    let id = j.id;
    store.create(j).await.unwrap();

    assert!(store.remove(id).await.is_some());
    assert!(store.get(id).await.is_none());
    assert!(store.remove(id).await.is_none());
}
