//! Storage backend trait shared by the relational and file stores.

use async_trait::async_trait;
use hangar_core::models::{
    AircraftRecord, CommunicationLogEntry, InventoryItem, NewCommunication, UserCredential,
};
use std::fmt;

use crate::error::StorageResult;

/// Which store a session ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Relational,
    File,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::File => "file",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The CRUD contract every backend implements.
///
/// Inputs arrive already validated by the session. Implementations assign
/// `last_update`, `last_updated`, communication ids and timestamps
/// themselves and ignore any values the caller put there.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Insert or fully replace the aircraft with this id.
    async fn upsert_aircraft(&self, record: &AircraftRecord) -> StorageResult<()>;

    /// Every stored aircraft, in no particular order.
    async fn list_aircraft(&self) -> StorageResult<Vec<AircraftRecord>>;

    /// Insert or fully replace the inventory item with this id.
    async fn upsert_inventory_item(&self, item: &InventoryItem) -> StorageResult<()>;

    /// Every stored inventory item, in no particular order.
    async fn list_inventory(&self) -> StorageResult<Vec<InventoryItem>>;

    /// Append an entry and return its newly assigned id.
    async fn append_communication(&self, entry: &NewCommunication) -> StorageResult<i64>;

    /// Newest entries first, at most `limit` of them; `None` returns all.
    async fn list_communications(
        &self,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CommunicationLogEntry>>;

    async fn user_exists(&self, username: &str) -> StorageResult<bool>;

    /// Byte-exact comparison against the stored digest.
    async fn check_credentials(&self, username: &str, password_hash: &str) -> StorageResult<bool>;

    /// Fails with `DuplicateUser` rather than replacing an existing entry.
    async fn add_user(&self, credential: &UserCredential) -> StorageResult<()>;

    /// Release any held resources.
    async fn close(&self) -> StorageResult<()>;

    fn kind(&self) -> BackendKind;
}
