//! Audit event and sink seam shared by actions and audit channels

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Before/after snapshot of one field for one action invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Field the event reports on
    pub field: String,

    /// Value before the wrapped action ran
    pub before: Option<String>,

    /// Value after the wrapped action ran
    pub after: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(field: impl Into<String>, before: Option<String>, after: Option<String>) -> Self {
        Self {
            field: field.into(),
            before,
            after,
        }
    }

    /// Whether the action changed the field
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Consumer of audit events, usually forwarding to an external channel.
///
/// Sinks are shared across pipelines behind `Arc<dyn AuditSink>`, so any
/// mutable resource (a connection, a buffer) must be synchronized internally.
pub trait AuditSink: Send + Sync + Debug {
    /// Sink name used in logs and dispatch errors
    fn name(&self) -> &str;

    /// Record one event. May block on I/O; no timeout is imposed by callers.
    fn handle(&self, event: &AuditEvent) -> Result<()>;
}
