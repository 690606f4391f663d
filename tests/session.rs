use incidens_console::session::SessionStore;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

fn session_path(dir: &TempDir) -> PathBuf {
    dir.path().join("session.json")
}

#[tokio::test]
async fn starts_signed_out_when_no_session_file_exists() {
    let dir = TempDir::new().expect("dir");
    let store = SessionStore::open(session_path(&dir)).await;
    assert!(!store.has_token().await);
    assert_eq!(store.token().await, None);
}

#[tokio::test]
async fn store_persists_and_a_reopened_store_restores_the_token() {
    let dir = TempDir::new().expect("dir");
    let store = SessionStore::open(session_path(&dir)).await;
    store
        .store("tok-abc".to_string())
        .await
        .expect("store token");

    let raw = std::fs::read(session_path(&dir)).expect("session file");
    let record: Value = serde_json::from_slice(&raw).expect("json record");
    assert_eq!(record["access_token"], "tok-abc");
    assert!(record.get("saved_at").is_some());

    let reopened = SessionStore::open(session_path(&dir)).await;
    assert_eq!(reopened.token().await, Some("tok-abc".to_string()));
}

#[tokio::test]
async fn corrupt_session_files_are_ignored() {
    let dir = TempDir::new().expect("dir");
    std::fs::write(session_path(&dir), b"{this is not json").expect("write");
    let store = SessionStore::open(session_path(&dir)).await;
    assert!(!store.has_token().await);

    std::fs::write(session_path(&dir), b"").expect("write");
    let store = SessionStore::open(session_path(&dir)).await;
    assert!(!store.has_token().await);
}

#[tokio::test]
async fn clear_removes_the_file_and_is_idempotent() {
    let dir = TempDir::new().expect("dir");
    let store = SessionStore::open(session_path(&dir)).await;
    store
        .store("tok-abc".to_string())
        .await
        .expect("store token");
    assert!(session_path(&dir).exists());

    store.clear().await.expect("clear");
    assert!(!session_path(&dir).exists());
    assert_eq!(store.token().await, None);

    store.clear().await.expect("clear again");
}

#[tokio::test]
async fn a_new_token_replaces_the_previous_one() {
    let dir = TempDir::new().expect("dir");
    let store = SessionStore::open(session_path(&dir)).await;
    store
        .store("tok-old".to_string())
        .await
        .expect("store token");
    store
        .store("tok-new".to_string())
        .await
        .expect("replace token");
    assert_eq!(store.token().await, Some("tok-new".to_string()));

    let reopened = SessionStore::open(session_path(&dir)).await;
    assert_eq!(reopened.token().await, Some("tok-new".to_string()));
}

#[tokio::test]
async fn store_creates_missing_state_directories() {
    let dir = TempDir::new().expect("dir");
    let nested = dir.path().join("state").join("console").join("session.json");
    let store = SessionStore::open(nested.clone()).await;
    store
        .store("tok-abc".to_string())
        .await
        .expect("store token");
    assert!(nested.exists());
}
