//! Pipeline file configuration
//!
//! ```yaml
//! steps:
//!   - action: mask
//!     audit: true
//!     config:
//!       field: email
//!       strategy: regex
//!       pattern: "^.(?P<mask>[^@]*).@"
//!   - action: tokenize
//!     config: { field: ssn, strategy: hash, salt: pepper }
//! ```

use fieldguard_core::{AuditSink, Error, Result};
use fieldguard_policy::{ActionConfig, ActionRegistry, AuditFailureMode, Pipeline, PipelineBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A pipeline declared as a list of registry actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineFile {
    /// How audited steps report failing actions
    #[serde(default)]
    pub audit_failure_mode: AuditFailureMode,

    pub steps: Vec<StepConfig>,
}

/// One pipeline step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Registered action name
    pub action: String,

    /// Wrap the step with the configured audit sink
    #[serde(default)]
    pub audit: bool,

    /// Field reported by the audit wrapper; defaults to `config.field`
    #[serde(default)]
    pub audit_field: Option<String>,

    /// Provider configuration
    #[serde(default)]
    pub config: ActionConfig,
}

impl StepConfig {
    fn audited_field(&self) -> Result<String> {
        if let Some(field) = &self.audit_field {
            return Ok(field.clone());
        }
        self.config
            .get("field")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::config(format!(
                    "audited '{}' step needs audit_field or config.field",
                    self.action
                ))
            })
    }
}

impl PipelineFile {
    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Parse from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Whether any step is audited
    pub fn needs_audit(&self) -> bool {
        self.steps.iter().any(|s| s.audit)
    }

    /// Create every step through `registry` and freeze the pipeline
    pub fn build(&self, registry: &ActionRegistry, sink: Arc<dyn AuditSink>) -> Result<Pipeline> {
        let mut builder = PipelineBuilder::new().audit_failure_mode(self.audit_failure_mode);

        for (index, step) in self.steps.iter().enumerate() {
            let audit_field = if step.audit {
                Some(step.audited_field()?)
            } else {
                None
            };
            let action = registry.create_action(&step.action, &step.config)?;
            debug!(step = index, action = %step.action, audit = step.audit, "Adding pipeline step");

            builder = match audit_field {
                Some(field) => builder.audited(field, action, sink.clone()),
                None => builder.action(action),
            };
        }

        builder.build()
    }
}
