use super::*;

async fn temp_store() -> (tempfile::TempDir, CredentialStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("portal.db");
    let url = format!("sqlite://{}", db_path.display());
    let store = CredentialStore::new(&url).await.expect("open store");
    (dir, store)
}

#[tokio::test]
async fn fresh_store_has_no_token() {
    let (_dir, store) = temp_store().await;
    assert_eq!(store.load_token().await.expect("load"), None);
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let (_dir, store) = temp_store().await;
    store.save_token("abc.def.ghi").await.expect("save");
    assert_eq!(
        store.load_token().await.expect("load"),
        Some("abc.def.ghi".to_string())
    );
}

#[tokio::test]
async fn save_overwrites_previous_token() {
    let (_dir, store) = temp_store().await;
    store.save_token("first").await.expect("save first");
    store.save_token("second").await.expect("save second");
    assert_eq!(
        store.load_token().await.expect("load"),
        Some("second".to_string())
    );
}

#[tokio::test]
async fn clear_removes_token_and_is_idempotent() {
    let (_dir, store) = temp_store().await;
    store.save_token("tok").await.expect("save");
    store.clear_token().await.expect("clear");
    assert_eq!(store.load_token().await.expect("load"), None);
    store.clear_token().await.expect("clear again");
}

#[tokio::test]
async fn creates_parent_dir_for_nested_database_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("nested").join("data").join("portal.db");
    let url = format!("sqlite://{}", db_path.display());
    let store = CredentialStore::new(&url).await.expect("open store");
    store.health_check().await.expect("ping");
    assert!(db_path.parent().expect("parent").exists());
}

#[tokio::test]
async fn token_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("portal.db");
    let url = format!("sqlite://{}", db_path.display());

    {
        let store = CredentialStore::new(&url).await.expect("open store");
        store.save_token("persisted").await.expect("save");
    }

    let reopened = CredentialStore::new(&url).await.expect("reopen store");
    assert_eq!(
        reopened.load_token().await.expect("load"),
        Some("persisted".to_string())
    );
}
