//! Error types for FieldGuard

/// Result type alias using FieldGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for FieldGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No provider is registered under the requested action name
    #[error("action '{name}' not found (available: {})", .available.join(", "))]
    ActionNotFound {
        /// Name that was looked up
        name: String,
        /// Names registered at lookup time
        available: Vec<String>,
    },

    /// A provider rejected the configuration it was given
    #[error("invalid configuration for action '{name}': {reason}")]
    InvalidConfig {
        /// Provider name
        name: String,
        /// Why the factory rejected the config
        reason: String,
    },

    /// Invalid strategy parameters, key material, or registration data
    #[error("validation error: {0}")]
    Validation(String),

    /// A transform could not convert a value
    #[error("transform error{}: {message}", .field.as_ref().map(|f| format!(" on field '{f}'")).unwrap_or_default())]
    Transform {
        /// Field being transformed, when known
        field: Option<String>,
        /// Underlying failure
        message: String,
    },

    /// A single audit sink failed to record an event
    #[error("audit sink '{sink}' failed: {message}")]
    AuditDispatch {
        /// Sink name
        sink: String,
        /// Underlying failure
        message: String,
    },

    /// A composite action stopped at a failing child
    #[error("pipeline aborted at step {step}: {source}")]
    PipelineAbort {
        /// Zero-based index of the failing child
        step: usize,
        /// The child's error
        #[source]
        source: Box<Error>,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new transform error not yet bound to a field
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform {
            field: None,
            message: msg.into(),
        }
    }

    /// Create a new audit dispatch error
    pub fn audit(sink: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::AuditDispatch {
            sink: sink.into(),
            message: msg.into(),
        }
    }

    /// Create a new invalid-config error for a provider
    pub fn invalid_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach a field name to a transform error that has none yet
    pub fn on_field(self, name: &str) -> Self {
        match self {
            Self::Transform {
                field: None,
                message,
            } => Self::Transform {
                field: Some(name.to_string()),
                message,
            },
            other => other,
        }
    }

    /// Innermost error beneath any number of pipeline aborts
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Self::PipelineAbort { source, .. } = current {
            current = source;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_action() {
        let err = Error::ActionNotFound {
            name: "unknown".to_string(),
            available: vec!["mask".to_string(), "tokenize".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'unknown'"));
        assert!(msg.contains("mask, tokenize"));
    }

    #[test]
    fn test_transform_field_attached_once() {
        let err = Error::transform("bad cipher").on_field("ssn").on_field("other");
        assert_eq!(err.to_string(), "transform error on field 'ssn': bad cipher");
    }

    #[test]
    fn test_root_cause_unwraps_nested_aborts() {
        let err = Error::PipelineAbort {
            step: 1,
            source: Box::new(Error::PipelineAbort {
                step: 0,
                source: Box::new(Error::audit("webhook", "down")),
            }),
        };
        assert!(matches!(err.root_cause(), Error::AuditDispatch { sink, .. } if sink == "webhook"));
    }
}
