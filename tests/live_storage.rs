// ABOUTME: Integration tests against a real storage zone.
// ABOUTME: Run with the `live` test group and STAGEHAND_LIVE_ZONE / STAGEHAND_LIVE_KEY set.

mod support;

use bytes::Bytes;
use stagehand::deploy::{Engine, LocalBuild, RetryPolicies};
use stagehand::store::{DEFAULT_STORAGE_ENDPOINT, HttpStore, ObjectStore, list_files};
use stagehand::telemetry::TracingTelemetry;
use stagehand::types::StorageRoot;
use std::time::Duration;

fn live_store() -> (HttpStore, StorageRoot) {
    let zone = std::env::var("STAGEHAND_LIVE_ZONE").expect("STAGEHAND_LIVE_ZONE must be set");
    let key = std::env::var("STAGEHAND_LIVE_KEY").expect("STAGEHAND_LIVE_KEY must be set");
    let endpoint = std::env::var("STAGEHAND_LIVE_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_STORAGE_ENDPOINT.to_string());

    let store = HttpStore::new(&endpoint, key, Duration::from_secs(60)).unwrap();
    (store, StorageRoot::new(&zone).unwrap())
}

#[test_group::group(live)]
#[tokio::test]
async fn object_round_trip() {
    support::init_tracing();
    let (store, root) = live_store();
    let key = root.live_key("__stagehand_test__/round-trip.txt");

    store.put(&key, Bytes::from_static(b"round trip")).await.unwrap();
    assert_eq!(store.get(&key).await.unwrap(), Bytes::from_static(b"round trip"));

    let files = list_files(&store, &root.live_key("__stagehand_test__"))
        .await
        .unwrap();
    assert_eq!(files, vec![key.clone()]);

    store.delete(&root.live_key("__stagehand_test__/")).await.unwrap();
    assert!(store.get(&key).await.unwrap_err().is_not_found());
}

#[test_group::group(live)]
#[tokio::test]
async fn deploy_activate_flush_cycle() {
    support::init_tracing();
    let (store, root) = live_store();
    let telemetry = TracingTelemetry;
    let engine =
        Engine::new(&store, &telemetry).with_retry(RetryPolicies::with_delay(Duration::from_secs(1)));

    let previous = engine.live_version(&root).await.unwrap();

    let dir = support::build_dir(&[("index.html", "<h1>live test</h1>"), ("a/b.txt", "b")]);
    let build = LocalBuild::open(dir.path()).unwrap();
    let hash = build.fingerprint().unwrap();

    let uploaded = engine.upload_snapshot(&build, &root, &hash).await.unwrap();
    assert!(uploaded.is_done());

    let listed = engine.list_snapshots(&root).await.unwrap();
    assert!(listed.iter().any(|s| s.hash == hash));

    // Leave whatever was live in place; only flush the test snapshot.
    if previous.as_ref() != Some(&hash) {
        let flush = engine.flush(&root, &hash).await.unwrap();
        assert!(flush.outcome.is_done());
    }
}
