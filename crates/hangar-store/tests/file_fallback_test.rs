//! Storage contract on the JSON file fallback.

mod common;

use std::path::Path;
use std::time::Duration;

use hangar_core::models::{InventoryItem, InventoryStatus};
use hangar_store::{open, BackendKind, RelationalConfig, Session, StorageError, StoreConfig};

async fn file_session(dir: &Path) -> Session {
    let session = open(&StoreConfig::file_only(dir)).await;
    assert_eq!(session.backend_kind(), BackendKind::File);
    session
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_aircraft_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(dir.path()).await;
    common::check_aircraft_last_write_wins(&session, "AC001").await;

    let on_disk = read_json(&dir.path().join("aircraft.json"));
    assert_eq!(on_disk.as_object().unwrap().len(), 1);
    assert_eq!(on_disk["AC001"]["altitude"], 35000.0);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_inventory_full_replace() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(dir.path()).await;
    common::check_inventory_replace(&session, "INV001").await;
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_communication_ids_start_at_one() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(dir.path()).await;
    let ids = common::check_communication_order(&session, "file").await;
    assert_eq!(ids, [1, 2, 3]);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_unbounded_listing_returns_everything() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(dir.path()).await;
    for n in 0..60 {
        session
            .append_communication(&common::comm(&format!("m{n}")))
            .await
            .unwrap();
    }

    let all = session.list_communications(None).await.unwrap();
    assert_eq!(all.len(), 60);
    assert_eq!(all[0].message, "m59");
    assert_eq!(all[59].id, 1);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_user_uniqueness() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(dir.path()).await;
    common::check_user_uniqueness(&session, "pilot1").await;

    let on_disk = read_json(&dir.path().join("users.json"));
    assert_eq!(on_disk, serde_json::json!({ "pilot1": "h1" }));
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_data_survives_new_session() {
    let dir = tempfile::tempdir().unwrap();

    let first = file_session(dir.path()).await;
    first.add_user("pilot2", "abc").await.unwrap();
    first.append_communication(&common::comm("before")).await.unwrap();
    first.close().await.unwrap();

    let second = file_session(dir.path()).await;
    assert!(second.check_credentials("pilot2", "abc").await.unwrap());
    let id = second
        .append_communication(&common::comm("after"))
        .await
        .unwrap();
    assert_eq!(id, 2);
    second.close().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_store_falls_back_to_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::file_only(dir.path())
        .with_relational(RelationalConfig::new("127.0.0.1", "ops", "hangar").with_port(1))
        .with_connect_timeout(Duration::from_secs(1));

    let session = open(&config).await;
    assert_eq!(session.backend_kind(), BackendKind::File);
    assert!(session.fallback_reason().is_some());

    let item = InventoryItem::new("INV777", "Landing Gear", 4, InventoryStatus::Available);
    session.upsert_inventory_item(&item).await.unwrap();

    let listed = session.list_inventory().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].item_id, "INV777");
    assert_eq!(listed[0].quantity, 4);

    let on_disk = read_json(&dir.path().join("inventory.json"));
    assert_eq!(on_disk["INV777"]["item_name"], "Landing Gear");
    assert_eq!(on_disk["INV777"]["quantity"], 4);
    assert_eq!(on_disk["INV777"]["status"], "Available");
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_unwritable_directory_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the data directory should be.
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();

    let session = open(&StoreConfig::file_only(&blocked)).await;
    let err = session
        .upsert_aircraft(&common::aircraft("AC009", 1000.0))
        .await
        .unwrap_err();
    assert!(err.is_file_error(), "unexpected error: {err}");
    assert!(!matches!(err, StorageError::Validation(_)));
}
