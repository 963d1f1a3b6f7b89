//! The storage facade handed to callers.

use hangar_core::models::{
    AircraftRecord, CommunicationLogEntry, InventoryItem, NewCommunication, UserCredential,
};
use tracing::{debug, info};

use crate::backend::{BackendKind, StorageBackend};
use crate::error::StorageResult;

/// An open storage session.
///
/// Owns exactly one backend, chosen when the session was opened, and routes
/// every call to it. Records are validated here so nothing invalid reaches
/// either backend. Call [`Session::close`] on every exit path once the unit
/// of work is done.
pub struct Session {
    backend: Box<dyn StorageBackend>,
    fallback_reason: Option<String>,
}

impl Session {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            fallback_reason: None,
        }
    }

    /// A session on the file store, remembering why the relational store was skipped.
    pub fn degraded(backend: Box<dyn StorageBackend>, reason: impl Into<String>) -> Self {
        Self {
            backend,
            fallback_reason: Some(reason.into()),
        }
    }

    /// Diagnostic only; calling code never needs to branch on this.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Why the relational store was not used, if it wasn't.
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    pub async fn upsert_aircraft(&self, record: &AircraftRecord) -> StorageResult<()> {
        record.validate()?;
        debug!("Upserting aircraft {}", record.aircraft_id);
        self.backend.upsert_aircraft(record).await
    }

    pub async fn list_aircraft(&self) -> StorageResult<Vec<AircraftRecord>> {
        self.backend.list_aircraft().await
    }

    pub async fn upsert_inventory_item(&self, item: &InventoryItem) -> StorageResult<()> {
        item.validate()?;
        debug!("Upserting inventory item {}", item.item_id);
        self.backend.upsert_inventory_item(item).await
    }

    pub async fn list_inventory(&self) -> StorageResult<Vec<InventoryItem>> {
        self.backend.list_inventory().await
    }

    /// Append to the communications log, returning the assigned id.
    pub async fn append_communication(&self, entry: &NewCommunication) -> StorageResult<i64> {
        entry.validate()?;
        let id = self.backend.append_communication(entry).await?;
        debug!("Logged communication {} ({})", id, entry.message_type);
        Ok(id)
    }

    /// Most recent entries first, at most `limit` of them.
    ///
    /// `None` returns the whole log. That reading of "no limit" is a
    /// convention shared by both backends.
    pub async fn list_communications(
        &self,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CommunicationLogEntry>> {
        self.backend.list_communications(limit).await
    }

    pub async fn user_exists(&self, username: &str) -> StorageResult<bool> {
        self.backend.user_exists(username).await
    }

    /// Compare `password_hash` to the stored digest. Hashing is the caller's job.
    pub async fn check_credentials(&self, username: &str, password_hash: &str) -> StorageResult<bool> {
        self.backend.check_credentials(username, password_hash).await
    }

    /// Register a user. Fails with `DuplicateUser` if the name is taken.
    pub async fn add_user(&self, username: &str, password_hash: &str) -> StorageResult<()> {
        let credential = UserCredential::new(username, password_hash);
        credential.validate()?;
        self.backend.add_user(&credential).await?;
        info!("Registered user {}", username);
        Ok(())
    }

    /// Release the backend.
    pub async fn close(self) -> StorageResult<()> {
        debug!("Closing {} session", self.backend.kind());
        self.backend.close().await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend.kind())
            .field("fallback_reason", &self.fallback_reason)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::file::FileBackend;
    use hangar_core::models::{InventoryStatus, MessagePriority, MessageStatus};

    async fn file_session(dir: &std::path::Path) -> Session {
        Session::new(Box::new(FileBackend::open(dir).await))
    }

    #[tokio::test]
    async fn test_invalid_record_never_reaches_backend() {
        let dir = tempfile::tempdir().unwrap();
        let session = file_session(dir.path()).await;

        let bad = AircraftRecord::new("", "F-16", 10.0, 10.0);
        let err = session.upsert_aircraft(&bad).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let raw = std::fs::read_to_string(dir.path().join("aircraft.json")).unwrap();
        assert_eq!(raw, "{}");
    }

    #[tokio::test]
    async fn test_invalid_communication_consumes_no_id() {
        let dir = tempfile::tempdir().unwrap();
        let session = file_session(dir.path()).await;

        let bad = NewCommunication::new("", MessagePriority::Low, "x", MessageStatus::Pending);
        assert!(session.append_communication(&bad).await.is_err());

        let good = NewCommunication::new("Status Update", MessagePriority::Low, "x", MessageStatus::Pending);
        assert_eq!(session.append_communication(&good).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_inventory_round_trip_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let session = file_session(dir.path()).await;
        assert_eq!(session.backend_kind(), BackendKind::File);
        assert!(session.fallback_reason().is_none());

        let item = InventoryItem::new("INV042", "Fuel Systems", 3, InventoryStatus::InUse);
        session.upsert_inventory_item(&item).await.unwrap();
        let listed = session.list_inventory().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].item_name, "Fuel Systems");
        assert_eq!(listed[0].status, InventoryStatus::InUse);
        assert!(listed[0].last_updated.is_some());

        session.close().await.unwrap();
    }
}
