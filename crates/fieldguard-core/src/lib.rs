//! FieldGuard Core
//!
//! Core types, traits, and utilities shared across FieldGuard components.
//!
//! This crate provides:
//! - The `Record` type that actions mutate in place
//! - The `AuditEvent` snapshot and the `AuditSink` seam
//! - Error types and result handling

pub mod audit;
pub mod error;
pub mod types;

pub use audit::{AuditEvent, AuditSink};
pub use error::{Error, Result};
pub use types::{record_from_json, record_to_json, Record};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::audit::{AuditEvent, AuditSink};
    pub use crate::error::{Error, Result};
    pub use crate::types::Record;
}
