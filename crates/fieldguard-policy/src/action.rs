//! Action definitions
//!
//! An action operates on a whole record:
//! - `SingleFieldAction` applies one transform to one field
//! - `CompositeAction` runs children in order, failing fast
//! - `AuditWrapperAction` reports a field's before/after values to a sink

use fieldguard_core::{AuditEvent, AuditSink, Error, Record, Result};
use fieldguard_transform::{StrategyDescriptor, Transform, TransformKind};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

/// Trait for all actions.
///
/// Actions are built once and replayed against many records, possibly from
/// several threads at once, so `apply` must not rely on per-call mutable state.
pub trait Action: Send + Sync + Debug {
    /// Apply the action to a record in place
    fn apply(&self, record: &mut Record) -> Result<()>;

    /// Describe the action as a serializable tagged variant
    fn descriptor(&self) -> ActionDescriptor;
}

/// Serializable description of an action tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDescriptor {
    /// A transform bound to one field
    Transform {
        field: String,
        kind: TransformKind,
        strategy: StrategyDescriptor,
    },

    /// Ordered children
    Composite { actions: Vec<ActionDescriptor> },

    /// An action whose field changes are reported to a sink
    Audited {
        field: String,
        sink: String,
        mode: AuditFailureMode,
        action: Box<ActionDescriptor>,
    },

    /// An action supplied by an external provider
    Custom {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
}

/// Whether the sink hears about a wrapped action that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditFailureMode {
    /// Propagate the failure without notifying the sink
    #[default]
    Skip,

    /// Notify the sink with the field's current value, then propagate
    BestEffort,
}

/// Applies one transform to one named field
#[derive(Debug)]
pub struct SingleFieldAction {
    field: String,
    transform: Box<dyn Transform>,
}

impl SingleFieldAction {
    /// Create a new single-field action
    pub fn new(field: impl Into<String>, transform: impl Transform + 'static) -> Self {
        Self::boxed(field, Box::new(transform))
    }

    /// Create from an already boxed transform
    pub fn boxed(field: impl Into<String>, transform: Box<dyn Transform>) -> Self {
        Self {
            field: field.into(),
            transform,
        }
    }

    /// Target field name
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Action for SingleFieldAction {
    fn apply(&self, record: &mut Record) -> Result<()> {
        match record.get_mut(&self.field) {
            Some(Some(value)) => {
                *value = self
                    .transform
                    .transform(value)
                    .map_err(|e| e.on_field(&self.field))?;
            }
            // Absent or null: nothing to protect
            _ => debug!(field = %self.field, "field absent or null, skipping"),
        }
        Ok(())
    }

    fn descriptor(&self) -> ActionDescriptor {
        let strategy = self.transform.descriptor();
        ActionDescriptor::Transform {
            field: self.field.clone(),
            kind: strategy.kind(),
            strategy,
        }
    }
}

/// Runs child actions in insertion order
#[derive(Debug, Default)]
pub struct CompositeAction {
    actions: Vec<Box<dyn Action>>,
}

impl CompositeAction {
    /// Freeze a list of actions
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Self { actions }
    }

    /// A composite with no children; applying it changes nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether there are no children
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Action for CompositeAction {
    fn apply(&self, record: &mut Record) -> Result<()> {
        for (step, action) in self.actions.iter().enumerate() {
            // Fail fast; earlier mutations stay applied
            action.apply(record).map_err(|source| {
                warn!(step, error = %source, "composite action aborted");
                Error::PipelineAbort {
                    step,
                    source: Box::new(source),
                }
            })?;
        }
        Ok(())
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor::Composite {
            actions: self.actions.iter().map(|a| a.descriptor()).collect(),
        }
    }
}

/// Captures a field before and after a wrapped action and reports it
#[derive(Debug)]
pub struct AuditWrapperAction {
    field: String,
    sink: Arc<dyn AuditSink>,
    action: Box<dyn Action>,
    mode: AuditFailureMode,
}

impl AuditWrapperAction {
    /// Wrap `action`, reporting changes of `field` to `sink`
    pub fn new(field: impl Into<String>, sink: Arc<dyn AuditSink>, action: Box<dyn Action>) -> Self {
        Self {
            field: field.into(),
            sink,
            action,
            mode: AuditFailureMode::default(),
        }
    }

    /// Set how a failing wrapped action is reported
    pub fn with_failure_mode(mut self, mode: AuditFailureMode) -> Self {
        self.mode = mode;
        self
    }

    fn snapshot(&self, record: &Record) -> Option<String> {
        record.get(&self.field).cloned().flatten()
    }
}

impl Action for AuditWrapperAction {
    fn apply(&self, record: &mut Record) -> Result<()> {
        let before = self.snapshot(record);

        if let Err(err) = self.action.apply(record) {
            if self.mode == AuditFailureMode::BestEffort {
                let event = AuditEvent::new(&self.field, before, self.snapshot(record));
                // The wrapped action's error wins over a sink error here
                if let Err(sink_err) = self.sink.handle(&event) {
                    warn!(
                        field = %self.field,
                        sink = %self.sink.name(),
                        error = %sink_err,
                        "best-effort audit of failed action also failed"
                    );
                }
            }
            return Err(err);
        }

        let event = AuditEvent::new(&self.field, before, self.snapshot(record));
        debug!(
            field = %self.field,
            sink = %self.sink.name(),
            changed = event.changed(),
            "dispatching audit event"
        );
        self.sink.handle(&event)
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor::Audited {
            field: self.field.clone(),
            sink: self.sink.name().to_string(),
            mode: self.mode,
            action: Box::new(self.action.descriptor()),
        }
    }
}
