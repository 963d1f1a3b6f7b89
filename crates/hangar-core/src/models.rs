//! Core data models for the hangar operations store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

/// Last known position and motion of a tracked aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftRecord {
    pub aircraft_id: String,
    #[serde(rename = "type")]
    pub aircraft_type: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Feet
    pub altitude: f64,
    /// Knots
    pub speed: f64,
    /// Degrees from true north
    pub heading: f64,
    /// Assigned by the backend on every write; ignored on upsert.
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl AircraftRecord {
    /// Create a record positioned at the given coordinates, at rest.
    pub fn new(
        aircraft_id: impl Into<String>,
        aircraft_type: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            aircraft_id: aircraft_id.into(),
            aircraft_type: aircraft_type.into(),
            latitude,
            longitude,
            altitude: 0.0,
            speed: 0.0,
            heading: 0.0,
            last_update: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_velocity(mut self, heading: f64, speed: f64) -> Self {
        self.heading = heading;
        self.speed = speed;
        self
    }
}

/// A stocked part or consumable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub status: InventoryStatus,
    /// Assigned by the backend on every write; ignored on upsert.
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

impl InventoryItem {
    pub fn new(
        item_id: impl Into<String>,
        item_name: impl Into<String>,
        quantity: u32,
        status: InventoryStatus,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            item_name: item_name.into(),
            quantity,
            status,
            last_updated: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryStatus {
    #[default]
    Available,
    #[serde(rename = "In Use", alias = "InUse")]
    InUse,
    Maintenance,
}

impl InventoryStatus {
    pub const ALL: [InventoryStatus; 3] = [Self::Available, Self::InUse, Self::Maintenance];

    /// Stored spelling, shared by every backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::InUse => "In Use",
            Self::Maintenance => "Maintenance",
        }
    }
}

/// A caller-supplied communication, before the backend assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommunication {
    pub message_type: String,
    pub priority: MessagePriority,
    pub message: String,
    pub status: MessageStatus,
}

impl NewCommunication {
    pub fn new(
        message_type: impl Into<String>,
        priority: MessagePriority,
        message: impl Into<String>,
        status: MessageStatus,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            priority,
            message: message.into(),
            status,
        }
    }
}

/// A stored communication log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationLogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub message_type: String,
    pub priority: MessagePriority,
    pub message: String,
    pub status: MessageStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessagePriority {
    High,
    #[default]
    Medium,
    Low,
}

impl MessagePriority {
    pub const ALL: [MessagePriority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    #[default]
    Received,
    Pending,
    Acknowledged,
}

impl MessageStatus {
    pub const ALL: [MessageStatus; 3] = [Self::Received, Self::Pending, Self::Acknowledged];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Pending => "Pending",
            Self::Acknowledged => "Acknowledged",
        }
    }
}

/// A username and its precomputed password digest.
///
/// The digest is produced by the caller and compared byte-exact; nothing in
/// the storage layer hashes or decodes it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    pub username: String,
    pub password_hash: String,
}

impl UserCredential {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

// ========== STRING CONVERSIONS ==========

macro_rules! stored_enum {
    ($ty:ident, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .into_iter()
                    .find(|v| {
                        v.as_str().eq_ignore_ascii_case(trimmed)
                            || format!("{:?}", v).eq_ignore_ascii_case(trimmed)
                    })
                    .ok_or_else(|| ValidationError::UnknownValue {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}

stored_enum!(InventoryStatus, "status");
stored_enum!(MessagePriority, "priority");
stored_enum!(MessageStatus, "status");
