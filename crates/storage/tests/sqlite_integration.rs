use std::sync::Arc;

use chrono::Duration;
use sticker_core::model::RewardId;
use sticker_core::time::fixed_now;
use storage::repository::{KeyValueRepository, Storage};
use storage::sqlite::SqliteRepository;
use storage::ProgressStore;

fn id(raw: &str) -> RewardId {
    RewardId::new(raw).unwrap()
}

#[tokio::test]
async fn sqlite_records_round_trip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("greeting", "hello").await.unwrap();
    repo.set("greeting", "hi").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap().as_deref(), Some("hi"));

    repo.remove("greeting").await.unwrap();
    repo.remove("greeting").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn progress_store_persists_across_store_instances() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    let first = ProgressStore::new(Arc::clone(&storage.records), "sticker_book");
    first.commit_claim(&[], &id("sticker_1"), fixed_now()).await.unwrap();
    first
        .commit_claim(&[id("sticker_1")], &id("sticker_2"), fixed_now() + Duration::minutes(2))
        .await
        .unwrap();
    first.mark_celebrated().await.unwrap();

    // a second store over the same records sees the same progress, like a reload
    let reloaded = ProgressStore::new(Arc::clone(&storage.records), "sticker_book");
    let state = reloaded.try_load().await.unwrap();
    assert_eq!(state.collected(), &[id("sticker_1"), id("sticker_2")]);
    assert!(state.celebrated());
    assert_eq!(state.last_claim(), Some(fixed_now() + Duration::minutes(2)));

    reloaded.reset().await.unwrap();
    assert_eq!(first.load().await.collected_count(), 0);
}
