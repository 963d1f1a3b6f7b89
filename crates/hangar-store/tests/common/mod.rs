//! Contract checks shared by the file and relational suites.

#![allow(dead_code)]

use hangar_core::models::{
    AircraftRecord, InventoryItem, InventoryStatus, MessagePriority, MessageStatus,
    NewCommunication,
};
use hangar_store::{Session, StorageError};

pub fn aircraft(id: &str, altitude: f64) -> AircraftRecord {
    AircraftRecord::new(id, "F-35", 39.8283, -98.5795)
        .with_altitude(altitude)
        .with_velocity(90.0, 540.0)
}

pub fn comm(message: &str) -> NewCommunication {
    NewCommunication::new(
        "Status Update",
        MessagePriority::High,
        message,
        MessageStatus::Pending,
    )
}

pub async fn check_aircraft_last_write_wins(session: &Session, id: &str) {
    session.upsert_aircraft(&aircraft(id, 30000.0)).await.unwrap();
    session.upsert_aircraft(&aircraft(id, 35000.0)).await.unwrap();

    let matching: Vec<_> = session
        .list_aircraft()
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.aircraft_id == id)
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].altitude, 35000.0);
    assert_eq!(matching[0].aircraft_type, "F-35");
    assert_eq!(matching[0].heading, 90.0);
    assert!(matching[0].last_update.is_some());
}

pub async fn check_inventory_replace(session: &Session, id: &str) {
    let first = InventoryItem::new(id, "Avionics", 10, InventoryStatus::Available);
    let second = InventoryItem::new(id, "Avionics Rack", 0, InventoryStatus::Maintenance);
    session.upsert_inventory_item(&first).await.unwrap();
    session.upsert_inventory_item(&second).await.unwrap();

    let matching: Vec<_> = session
        .list_inventory()
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.item_id == id)
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].item_name, "Avionics Rack");
    assert_eq!(matching[0].quantity, 0);
    assert_eq!(matching[0].status, InventoryStatus::Maintenance);
    assert!(matching[0].last_updated.is_some());
}

/// Returns the three ids assigned.
pub async fn check_communication_order(session: &Session, tag: &str) -> [i64; 3] {
    let ids = [
        session.append_communication(&comm(&format!("{tag}-t1"))).await.unwrap(),
        session.append_communication(&comm(&format!("{tag}-t2"))).await.unwrap(),
        session.append_communication(&comm(&format!("{tag}-t3"))).await.unwrap(),
    ];
    assert_eq!(ids[1], ids[0] + 1);
    assert_eq!(ids[2], ids[1] + 1);

    let recent = session.list_communications(Some(2)).await.unwrap();
    let messages: Vec<_> = recent.iter().map(|e| e.message.clone()).collect();
    assert_eq!(messages, [format!("{tag}-t3"), format!("{tag}-t2")]);
    assert_eq!(recent[0].id, ids[2]);
    assert!(recent[0].timestamp >= recent[1].timestamp);
    assert_eq!(recent[0].priority, MessagePriority::High);
    assert_eq!(recent[0].status, MessageStatus::Pending);

    ids
}

pub async fn check_user_uniqueness(session: &Session, username: &str) {
    session.add_user(username, "h1").await.unwrap();
    let err = session.add_user(username, "h2").await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateUser { .. }));

    assert!(session.user_exists(username).await.unwrap());
    assert!(session.check_credentials(username, "h1").await.unwrap());
    assert!(!session.check_credentials(username, "h2").await.unwrap());
    assert!(!session.check_credentials(username, "H1").await.unwrap());
}
