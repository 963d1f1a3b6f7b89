//! Hangar store - PostgreSQL persistence with a JSON file fallback.
//!
//! A [`Session`] is opened with [`open`]; the relational store is tried once
//! and, on any failure, the session runs on local JSON files instead. Both
//! backends implement the same [`StorageBackend`] contract for aircraft,
//! inventory, communications and user credentials.

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod file;
pub mod manager;
pub mod relational;
pub mod session;

pub use backend::{BackendKind, StorageBackend};
pub use config::{ConfigError, RelationalConfig, StoreConfig};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use manager::{open, ConnectionManager};
pub use relational::RelationalBackend;
pub use session::Session;
