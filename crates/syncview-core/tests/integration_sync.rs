//! Integration tests: scheduler driving real file and HTTP sources with a
//! file-backed cache, and the filter engine over the synchronized items.

mod common;

use std::time::Duration;

use serde_json::{json, Value};
use syncview_core::cache::{CacheStore, FileBackend};
use syncview_core::filter::{FilterExpression, FilterOperator};
use syncview_core::scheduler::{SyncPhase, SyncScheduler, SyncState};
use syncview_core::source::{FileSource, HttpSource};
use syncview_core::{FilterEngine, FilterState, SyncOptions};
use tempfile::tempdir;

fn quick_retries(max_retries: u32) -> SyncOptions {
    SyncOptions {
        max_retries,
        retry_delay: Duration::from_millis(10),
        max_retry_delay: Duration::from_millis(50),
        ..SyncOptions::default()
    }
}

async fn settled<T: Clone + Send + Sync + 'static>(scheduler: &SyncScheduler<T>) -> SyncState<T> {
    let mut rx = scheduler.subscribe();
    let state = tokio::time::timeout(
        Duration::from_secs(10),
        rx.wait_for(|s| matches!(s.phase, SyncPhase::Ready | SyncPhase::Failed)),
    )
    .await
    .expect("scheduler settles in time")
    .expect("scheduler alive")
    .clone();
    state
}

#[tokio::test]
async fn file_source_writes_through_and_seeds_next_session() {
    let data = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    let path = data.path().join("scores.json");
    std::fs::write(
        &path,
        json!({"items": [{"name": "Acme", "score": 7}, {"name": "Globex", "score": 3}], "totalCount": 2})
            .to_string(),
    )
    .unwrap();
    let store = CacheStore::new(FileBackend::new(cache_dir.path()));

    let first = SyncScheduler::builder(FileSource::<Value>::new(&path))
        .options(quick_retries(3))
        .cache(store.clone(), "scores")
        .start();
    let state = settled(&first).await;
    assert_eq!(state.phase, SyncPhase::Ready);
    assert_eq!(state.items.len(), 2);
    assert!(!first.is_stale());
    first.dispose();

    // Source disappears; the next session still shows last-known-good data.
    std::fs::remove_file(&path).unwrap();
    let second = SyncScheduler::builder(FileSource::<Value>::new(&path))
        .options(quick_retries(2))
        .cache(store, "scores")
        .start();
    assert_eq!(second.state().items.len(), 2);
    let state = settled(&second).await;
    assert_eq!(state.phase, SyncPhase::Failed);
    assert_eq!(state.retry_count, 2);
    assert!(state.error.is_some());
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.total_count, 2);
}

#[tokio::test]
async fn http_source_recovers_from_transient_errors() {
    let body = json!({"items": [{"name": "Acme"}], "totalCount": 12}).to_string();
    let server = common::json_server::start(vec![
        (503, String::new()),
        (500, r#"{"message": "db restarting"}"#.to_string()),
        (200, body),
    ]);
    let source = HttpSource::<Value>::new(&server.url).unwrap();
    let scheduler = SyncScheduler::start(source, quick_retries(3));
    let state = settled(&scheduler).await;
    assert_eq!(state.phase, SyncPhase::Ready, "error: {:?}", state.error);
    assert_eq!(state.total_count, 12);
    assert_eq!(state.retry_count, 0);
    assert!(state.error.is_none());
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn http_auth_failure_is_not_retried() {
    let server = common::json_server::start(vec![(
        401,
        r#"{"message": "JWT expired"}"#.to_string(),
    )]);
    let source = HttpSource::<Value>::new(&server.url).unwrap();
    let scheduler = SyncScheduler::start(source, quick_retries(5));
    let state = settled(&scheduler).await;
    assert_eq!(state.phase, SyncPhase::Failed);
    assert_eq!(state.error.as_deref(), Some("JWT expired"));
    assert_eq!(state.retry_count, 0);
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn synchronized_items_feed_the_filter_engine() {
    let body = json!([
        {"name": "Acme", "score": 7},
        {"name": "Globex", "score": 3},
        {"name": "Initech"}
    ])
    .to_string();
    let server = common::json_server::start(vec![(200, body)]);
    let scheduler = SyncScheduler::start(
        HttpSource::<Value>::new(&server.url).unwrap(),
        SyncOptions::default(),
    );
    let state = settled(&scheduler).await;
    assert_eq!(state.total_count, 3);

    let filters = FilterState {
        expressions: vec![FilterExpression::new(
            "score",
            FilterOperator::Greater,
            json!(5),
        )],
        ..FilterState::default()
    };
    let out = FilterEngine::new(["name"]).evaluate(&state.items, &filters);
    assert_eq!(out, vec![json!({"name": "Acme", "score": 7})]);
}
