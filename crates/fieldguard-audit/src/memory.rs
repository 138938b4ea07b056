//! In-process audit sink

use fieldguard_core::{AuditEvent, AuditSink, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Collects events in memory, oldest first
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<VecDeque<AuditEvent>>,
    limit: Option<usize>,
}

impl MemorySink {
    /// Unbounded sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` events, dropping the oldest
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(limit)),
            limit: Some(limit),
        }
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AuditSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn handle(&self, event: &AuditEvent) -> Result<()> {
        let mut events = self.events.lock();
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Ok(());
            }
            while events.len() >= limit {
                events.pop_front();
            }
        }
        events.push_back(event.clone());
        Ok(())
    }
}
