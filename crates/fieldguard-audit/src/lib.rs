//! FieldGuard Audit
//!
//! Audit sinks that receive before/after snapshots from audited actions.
//!
//! Provides:
//! - Console, in-memory, SQLite, email and webhook sinks
//! - `CompositeSink` fan-out with per-sink failure isolation
//! - `AuditConfig` channel selection and `build_composite_sink`

pub mod composite;
pub mod config;
pub mod console;
pub mod database;
pub mod email;
pub mod memory;
pub mod template;
pub mod webhook;

pub use composite::CompositeSink;
pub use config::{
    build_composite_sink, AuditChannel, AuditConfig, ConsoleTarget, DatabaseConfig, EmailConfig, WebhookConfig,
    CHANNELS_ENV,
};
pub use console::ConsoleSink;
pub use database::{AuditRow, DatabaseSink};
pub use email::EmailSink;
pub use memory::MemorySink;
pub use template::{MessageTemplate, DEFAULT_MESSAGE_TEMPLATE};
pub use webhook::{WebhookPayload, WebhookSink};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::composite::CompositeSink;
    pub use crate::config::{build_composite_sink, AuditChannel, AuditConfig};
    pub use crate::memory::MemorySink;
}
