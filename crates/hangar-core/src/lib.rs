//! Hangar core - record types shared by every storage backend.

pub mod models;
pub mod validation;

pub use models::{
    AircraftRecord, CommunicationLogEntry, InventoryItem, InventoryStatus, MessagePriority,
    MessageStatus, NewCommunication, UserCredential,
};
pub use validation::ValidationError;
