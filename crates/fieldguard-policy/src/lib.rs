//! FieldGuard Policy
//!
//! Record-level actions and the pipelines that run them.
//!
//! - `action`: the `Action` trait plus single-field, composite and audit-wrapper actions
//! - `pipeline`: `PipelineBuilder` and the frozen `Pipeline`
//! - `registry`: name → provider lookup for configuration-driven pipelines
//! - `providers`: built-in mask, tokenize and encrypt providers

pub mod action;
pub mod pipeline;
pub mod providers;
pub mod registry;

pub use action::{
    Action, ActionDescriptor, AuditFailureMode, AuditWrapperAction, CompositeAction,
    SingleFieldAction,
};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use providers::{EncryptProvider, MaskProvider, TokenizeProvider};
pub use registry::{builtin_providers, ActionConfig, ActionProvider, ActionRegistry};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionDescriptor, AuditFailureMode};
    pub use crate::pipeline::{Pipeline, PipelineBuilder};
    pub use crate::registry::{ActionConfig, ActionProvider, ActionRegistry};
}
