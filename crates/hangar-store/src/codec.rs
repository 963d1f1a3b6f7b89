//! Record encoding for each backend.
//!
//! Relational rows are read through `sqlx::FromRow` structs; file documents
//! through serde structs whose field names match the JSON collections on
//! disk. Both decode into the same `hangar_core` records, so the two backends
//! hand callers identical field sets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use hangar_core::models::{
    AircraftRecord, CommunicationLogEntry, InventoryItem, InventoryStatus, MessagePriority,
    MessageStatus, NewCommunication,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{StorageError, StorageResult};

pub const AIRCRAFT: &str = "aircraft";
pub const INVENTORY: &str = "inventory";
pub const COMMUNICATIONS: &str = "communications";
pub const USERS: &str = "users";

fn parse_stored<T>(collection: &'static str, raw: Option<String>) -> StorageResult<T>
where
    T: FromStr<Err = hangar_core::ValidationError> + Default,
{
    match raw {
        None => Ok(T::default()),
        Some(s) => s
            .parse()
            .map_err(|e: hangar_core::ValidationError| {
                StorageError::decode(collection, e.to_string())
            }),
    }
}

// ========== RELATIONAL ROWS ==========

#[derive(Debug, sqlx::FromRow)]
pub struct AircraftRow {
    pub aircraft_id: String,
    #[sqlx(rename = "type")]
    pub aircraft_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub last_update: DateTime<Utc>,
}

impl From<AircraftRow> for AircraftRecord {
    fn from(row: AircraftRow) -> Self {
        AircraftRecord {
            aircraft_id: row.aircraft_id,
            aircraft_type: row.aircraft_type.unwrap_or_default(),
            latitude: row.latitude.unwrap_or_default(),
            longitude: row.longitude.unwrap_or_default(),
            altitude: row.altitude.unwrap_or_default(),
            speed: row.speed.unwrap_or_default(),
            heading: row.heading.unwrap_or_default(),
            last_update: Some(row.last_update),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct InventoryRow {
    pub item_id: String,
    pub item_name: Option<String>,
    pub quantity: Option<i32>,
    pub status: Option<String>,
    pub last_updated: NaiveDate,
}

impl TryFrom<InventoryRow> for InventoryItem {
    type Error = StorageError;

    fn try_from(row: InventoryRow) -> StorageResult<Self> {
        let quantity = u32::try_from(row.quantity.unwrap_or_default()).map_err(|_| {
            StorageError::decode(INVENTORY, format!("negative quantity for {}", row.item_id))
        })?;

        Ok(InventoryItem {
            status: parse_stored::<InventoryStatus>(INVENTORY, row.status)?,
            item_id: row.item_id,
            item_name: row.item_name.unwrap_or_default(),
            quantity,
            last_updated: Some(row.last_updated),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CommunicationRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub message_type: Option<String>,
    pub priority: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<CommunicationRow> for CommunicationLogEntry {
    type Error = StorageError;

    fn try_from(row: CommunicationRow) -> StorageResult<Self> {
        Ok(CommunicationLogEntry {
            id: row.id,
            timestamp: row.timestamp,
            message_type: row.message_type.unwrap_or_default(),
            priority: parse_stored::<MessagePriority>(COMMUNICATIONS, row.priority)?,
            message: row.message.unwrap_or_default(),
            status: parse_stored::<MessageStatus>(COMMUNICATIONS, row.status)?,
        })
    }
}

// ========== FILE DOCUMENTS ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftDoc {
    pub aircraft_id: String,
    #[serde(rename = "type", default)]
    pub aircraft_type: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub heading: f64,
    #[serde(default, with = "flexible_timestamp")]
    pub last_update: Option<DateTime<Utc>>,
}

impl AircraftDoc {
    /// Encode a record, stamping it with the write time.
    pub fn stamped(record: &AircraftRecord, now: DateTime<Utc>) -> Self {
        Self {
            aircraft_id: record.aircraft_id.clone(),
            aircraft_type: record.aircraft_type.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            altitude: record.altitude,
            speed: record.speed,
            heading: record.heading,
            last_update: Some(now),
        }
    }
}

impl From<AircraftDoc> for AircraftRecord {
    fn from(doc: AircraftDoc) -> Self {
        AircraftRecord {
            aircraft_id: doc.aircraft_id,
            aircraft_type: doc.aircraft_type,
            latitude: doc.latitude,
            longitude: doc.longitude,
            altitude: doc.altitude,
            speed: doc.speed,
            heading: doc.heading,
            last_update: doc.last_update,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryDoc {
    pub item_id: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "flexible_date")]
    pub last_updated: Option<NaiveDate>,
}

impl InventoryDoc {
    pub fn stamped(item: &InventoryItem, today: NaiveDate) -> Self {
        Self {
            item_id: item.item_id.clone(),
            item_name: item.item_name.clone(),
            quantity: item.quantity,
            status: Some(item.status.as_str().to_string()),
            last_updated: Some(today),
        }
    }
}

impl TryFrom<InventoryDoc> for InventoryItem {
    type Error = StorageError;

    fn try_from(doc: InventoryDoc) -> StorageResult<Self> {
        Ok(InventoryItem {
            status: parse_stored::<InventoryStatus>(INVENTORY, doc.status)?,
            item_id: doc.item_id,
            item_name: doc.item_name,
            quantity: doc.quantity,
            last_updated: doc.last_updated,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationDoc {
    pub id: i64,
    #[serde(default, with = "flexible_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl CommunicationDoc {
    pub fn appended(entry: &NewCommunication, id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp: Some(now),
            message_type: entry.message_type.clone(),
            priority: Some(entry.priority.as_str().to_string()),
            message: entry.message.clone(),
            status: Some(entry.status.as_str().to_string()),
        }
    }

    /// Sort key for newest-first reads; id breaks timestamp ties.
    pub fn recency(&self) -> (Option<DateTime<Utc>>, i64) {
        (self.timestamp, self.id)
    }
}

impl TryFrom<CommunicationDoc> for CommunicationLogEntry {
    type Error = StorageError;

    fn try_from(doc: CommunicationDoc) -> StorageResult<Self> {
        // Undated legacy entries read as the Unix epoch and list last.
        Ok(CommunicationLogEntry {
            id: doc.id,
            timestamp: doc.timestamp.unwrap_or_default(),
            message_type: doc.message_type,
            priority: parse_stored::<MessagePriority>(COMMUNICATIONS, doc.priority)?,
            message: doc.message,
            status: parse_stored::<MessageStatus>(COMMUNICATIONS, doc.status)?,
        })
    }
}

/// Timestamps are written as RFC 3339 UTC. Reads also accept naive ISO
/// timestamps (no offset), taken as UTC.
mod flexible_timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            parse(&s).ok_or_else(|| {
                <D::Error as serde::de::Error>::custom(format!("bad timestamp: {s}"))
            })
        })
        .transpose()
    }

    pub(super) fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

mod flexible_date {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .ok()
                .or_else(|| super::flexible_timestamp::parse(&s).map(|ts| ts.date_naive()))
                .ok_or_else(|| <D::Error as serde::de::Error>::custom(format!("bad date: {s}")))
        })
        .transpose()
    }
}
