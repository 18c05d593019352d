use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_round_trips_values() {
    let repo = connect("memdb_kv_roundtrip").await;

    assert_eq!(repo.get("lesson-qa").await.unwrap(), None);

    repo.set("lesson-qa", r#"{"q0":"48 hours"}"#).await.unwrap();
    assert_eq!(
        repo.get("lesson-qa").await.unwrap().as_deref(),
        Some(r#"{"q0":"48 hours"}"#)
    );
}

#[tokio::test]
async fn sqlite_last_write_wins_and_remove_clears() {
    let repo = connect("memdb_kv_overwrite").await;

    repo.set("lesson-time", "12.5").await.unwrap();
    repo.set("lesson-time", "40").await.unwrap();
    assert_eq!(repo.get("lesson-time").await.unwrap().as_deref(), Some("40"));

    repo.remove("lesson-time").await.unwrap();
    assert_eq!(repo.get("lesson-time").await.unwrap(), None);

    // Removing again is a no-op.
    repo.remove("lesson-time").await.unwrap();
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_kv_migrate_twice").await;
    repo.set("lesson-done", "yesterday").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(
        repo.get("lesson-done").await.unwrap().as_deref(),
        Some("yesterday")
    );
}

#[tokio::test]
async fn storage_sqlite_wires_kv_store() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set("lesson-done", "now").await.unwrap();
    assert_eq!(
        storage.kv.get("lesson-done").await.unwrap().as_deref(),
        Some("now")
    );
}
