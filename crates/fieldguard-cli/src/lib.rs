//! FieldGuard CLI
//!
//! Runs configuration-declared pipelines over JSON-lines records.

pub mod cli;
pub mod config;
pub mod run;

pub use config::{PipelineFile, StepConfig};
pub use run::apply_stream;
