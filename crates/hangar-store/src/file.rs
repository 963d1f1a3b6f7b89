//! JSON file backend used when the relational store is unavailable.

use async_trait::async_trait;
use chrono::Utc;
use hangar_core::models::{
    AircraftRecord, CommunicationLogEntry, InventoryItem, NewCommunication, UserCredential,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::backend::{BackendKind, StorageBackend};
use crate::codec::{
    AircraftDoc, CommunicationDoc, InventoryDoc, AIRCRAFT, COMMUNICATIONS, INVENTORY, USERS,
};
use crate::error::{StorageError, StorageResult};

type AircraftCollection = BTreeMap<String, AircraftDoc>;
type InventoryCollection = BTreeMap<String, InventoryDoc>;
type CommunicationCollection = Vec<CommunicationDoc>;
type UserCollection = BTreeMap<String, String>;

/// File-backed store: one JSON document per collection in `data_dir`.
///
/// Every mutation reads the whole collection, changes it in memory and
/// writes the whole file back. Nothing is locked, so this backend supports
/// exactly one writer per data directory. Two processes (or two sessions)
/// writing the same directory can interleave their read-modify-write cycles
/// and lose updates.
#[derive(Debug, Clone)]
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Create the backend and seed any missing collection files.
    ///
    /// Seeding failures are logged, not returned: a missing file reads as an
    /// empty collection, and the first write surfaces the underlying error.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Self {
        let backend = Self::new(data_dir);
        match backend.initialize().await {
            Ok(()) => info!("File store ready at {}", backend.data_dir.display()),
            Err(e) => warn!("File store at {} not initialized: {}", backend.data_dir.display(), e),
        }
        backend
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the JSON document for a collection.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.json"))
    }

    /// Ensure the directory exists and every collection file is present.
    /// Keyed collections start as `{}`, the communications log as `[]`.
    pub async fn initialize(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StorageError::io(&self.data_dir, e))?;

        for collection in [AIRCRAFT, INVENTORY, COMMUNICATIONS, USERS] {
            let path = self.collection_path(collection);
            if fs::try_exists(&path)
                .await
                .map_err(|e| StorageError::io(&path, e))?
            {
                continue;
            }
            let empty = if collection == COMMUNICATIONS { "[]" } else { "{}" };
            debug!("Seeding empty collection {}", path.display());
            fs::write(&path, empty)
                .await
                .map_err(|e| StorageError::io(&path, e))?;
        }
        Ok(())
    }

    async fn read_collection<T>(&self, collection: &str) -> StorageResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.collection_path(collection);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(StorageError::io(&path, e)),
        };
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            path,
            message: e.to_string(),
        })
    }

    /// Replace the whole collection file.
    ///
    /// Writes a sibling temp file and renames it over the original, so a
    /// crash mid-write leaves the previous contents intact.
    async fn write_collection<T>(&self, collection: &str, data: &T) -> StorageResult<()>
    where
        T: Serialize,
    {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StorageError::io(&self.data_dir, e))?;

        let path = self.collection_path(collection);
        let tmp = self.data_dir.join(format!(".{collection}.json.tmp"));
        let json = serde_json::to_vec(data).map_err(|e| StorageError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&tmp, &json)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::io(&path, e))?;

        debug!("Wrote {} bytes to {}", json.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn upsert_aircraft(&self, record: &AircraftRecord) -> StorageResult<()> {
        let mut aircraft: AircraftCollection = self.read_collection(AIRCRAFT).await?;
        aircraft.insert(
            record.aircraft_id.clone(),
            AircraftDoc::stamped(record, Utc::now()),
        );
        self.write_collection(AIRCRAFT, &aircraft).await
    }

    async fn list_aircraft(&self) -> StorageResult<Vec<AircraftRecord>> {
        let aircraft: AircraftCollection = self.read_collection(AIRCRAFT).await?;
        Ok(aircraft.into_values().map(AircraftRecord::from).collect())
    }

    async fn upsert_inventory_item(&self, item: &InventoryItem) -> StorageResult<()> {
        let mut inventory: InventoryCollection = self.read_collection(INVENTORY).await?;
        inventory.insert(
            item.item_id.clone(),
            InventoryDoc::stamped(item, Utc::now().date_naive()),
        );
        self.write_collection(INVENTORY, &inventory).await
    }

    async fn list_inventory(&self) -> StorageResult<Vec<InventoryItem>> {
        let inventory: InventoryCollection = self.read_collection(INVENTORY).await?;
        inventory.into_values().map(InventoryItem::try_from).collect()
    }

    async fn append_communication(&self, entry: &NewCommunication) -> StorageResult<i64> {
        let mut log: CommunicationCollection = self.read_collection(COMMUNICATIONS).await?;
        let id = i64::try_from(log.len()).unwrap_or(i64::MAX - 1) + 1;
        log.push(CommunicationDoc::appended(entry, id, Utc::now()));
        self.write_collection(COMMUNICATIONS, &log).await?;
        Ok(id)
    }

    async fn list_communications(
        &self,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CommunicationLogEntry>> {
        let mut log: CommunicationCollection = self.read_collection(COMMUNICATIONS).await?;
        log.sort_by(|a, b| b.recency().cmp(&a.recency()));
        if let Some(limit) = limit {
            log.truncate(limit);
        }
        log.into_iter().map(CommunicationLogEntry::try_from).collect()
    }

    async fn user_exists(&self, username: &str) -> StorageResult<bool> {
        let users: UserCollection = self.read_collection(USERS).await?;
        Ok(users.contains_key(username))
    }

    async fn check_credentials(&self, username: &str, password_hash: &str) -> StorageResult<bool> {
        let users: UserCollection = self.read_collection(USERS).await?;
        Ok(users
            .get(username)
            .is_some_and(|stored| stored == password_hash))
    }

    async fn add_user(&self, credential: &UserCredential) -> StorageResult<()> {
        let mut users: UserCollection = self.read_collection(USERS).await?;
        if users.contains_key(&credential.username) {
            return Err(StorageError::duplicate_user(&credential.username));
        }
        users.insert(
            credential.username.clone(),
            credential.password_hash.clone(),
        );
        self.write_collection(USERS, &users).await
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::File
    }
}
