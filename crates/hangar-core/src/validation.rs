//! Field checks applied before any record is written.
//!
//! Widths mirror the relational column sizes so a record accepted here is
//! accepted by every backend.

use thiserror::Error;

use crate::models::{AircraftRecord, InventoryItem, NewCommunication, UserCredential};

pub const MAX_RECORD_ID_LEN: usize = 10;
pub const MAX_AIRCRAFT_TYPE_LEN: usize = 50;
pub const MAX_ITEM_NAME_LEN: usize = 100;
pub const MAX_MESSAGE_TYPE_LEN: usize = 50;
pub const MAX_USERNAME_LEN: usize = 50;
/// Column width for the stored digest (hex SHA-256).
pub const MAX_PASSWORD_HASH_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be finite")]
    NotFinite { field: &'static str },

    #[error("{field} {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("quantity {0} does not fit the stored integer range")]
    QuantityOverflow(u32),

    #[error("unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },
}

fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn require_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl AircraftRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("aircraft_id", &self.aircraft_id, MAX_RECORD_ID_LEN)?;
        require_text("type", &self.aircraft_type, MAX_AIRCRAFT_TYPE_LEN)?;
        require_range("latitude", self.latitude, -90.0, 90.0)?;
        require_range("longitude", self.longitude, -180.0, 180.0)?;
        if !self.altitude.is_finite() {
            return Err(ValidationError::NotFinite { field: "altitude" });
        }
        require_range("speed", self.speed, 0.0, f64::MAX)?;
        require_range("heading", self.heading, 0.0, 360.0)?;
        Ok(())
    }
}

impl InventoryItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("item_id", &self.item_id, MAX_RECORD_ID_LEN)?;
        require_text("item_name", &self.item_name, MAX_ITEM_NAME_LEN)?;
        if i32::try_from(self.quantity).is_err() {
            return Err(ValidationError::QuantityOverflow(self.quantity));
        }
        Ok(())
    }
}

impl NewCommunication {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("message_type", &self.message_type, MAX_MESSAGE_TYPE_LEN)
    }
}

impl UserCredential {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        require_text("password_hash", &self.password_hash, MAX_PASSWORD_HASH_LEN)
    }
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    require_text("username", username, MAX_USERNAME_LEN)
}
