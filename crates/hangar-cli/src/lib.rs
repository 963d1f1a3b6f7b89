//! Hangar CLI - command line access to the operations store.
//!
//! - auth: password hashing and registration rules
//! - export: filtered collection dumps as JSON or CSV

pub mod auth;
pub mod export;

pub use auth::hash_password;
pub use export::{collect, export, Collection, ExportFilter, ExportFormat, Records};
