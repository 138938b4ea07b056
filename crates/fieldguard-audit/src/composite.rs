//! Fan-out to several sinks with per-sink failure isolation

use fieldguard_core::{AuditEvent, AuditSink, Result};
use std::sync::Arc;
use tracing::{error, warn};

/// Forwards each event to every member sink in order.
///
/// A failing member is logged and counted, never propagated, and never
/// prevents later members from receiving the event.
#[derive(Debug, Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl CompositeSink {
    /// Create a composite over a fixed list of sinks
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }

    /// Number of member sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no member sinks
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Member sink names, in dispatch order
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

impl AuditSink for CompositeSink {
    fn name(&self) -> &str {
        "composite"
    }

    fn handle(&self, event: &AuditEvent) -> Result<()> {
        if self.sinks.is_empty() {
            warn!(field = %event.field, "no audit sinks configured, event dropped");
            return Ok(());
        }

        for sink in &self.sinks {
            if let Err(e) = sink.handle(event) {
                error!(
                    sink = %sink.name(),
                    field = %event.field,
                    error = %e,
                    "audit sink failed"
                );
                metrics::counter!("fieldguard_audit_sink_failures_total", "sink" => sink.name().to_string())
                    .increment(1);
            }
        }

        Ok(())
    }
}
