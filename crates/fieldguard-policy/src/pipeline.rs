//! Pipeline builder
//!
//! Accumulates actions in call order and freezes them into a [`Pipeline`].
//! Construction errors from fallible steps (bad key material) are held
//! until [`PipelineBuilder::build`] so calls can be chained.

use crate::action::{
    Action, ActionDescriptor, AuditFailureMode, AuditWrapperAction, CompositeAction,
    SingleFieldAction,
};
use fieldguard_core::{AuditSink, Error, Record, Result};
use fieldguard_transform::{Encryptor, MaskStrategy, RsaPublicKey, Tokenizer};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Fluent builder for pipelines
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    actions: Vec<Box<dyn Action>>,
    audit_mode: AuditFailureMode,
    error: Option<Error>,
}

impl PipelineBuilder {
    /// Create a new, empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how audited steps report a failing action. Applies to audited
    /// steps added after this call.
    pub fn audit_failure_mode(mut self, mode: AuditFailureMode) -> Self {
        self.audit_mode = mode;
        self
    }

    /// Append an arbitrary action
    pub fn action(mut self, action: Box<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Append an arbitrary action wrapped in an audit step
    pub fn audited(
        mut self,
        field: impl Into<String>,
        action: Box<dyn Action>,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        let wrapper = AuditWrapperAction::new(field, sink, action).with_failure_mode(self.audit_mode);
        self.actions.push(Box::new(wrapper));
        self
    }

    /// Mask `field`
    pub fn mask(self, field: impl Into<String>, strategy: MaskStrategy) -> Self {
        self.action(Box::new(SingleFieldAction::new(field, strategy)))
    }

    /// Tokenize `field`
    pub fn tokenize(self, field: impl Into<String>, tokenizer: Tokenizer) -> Self {
        self.action(Box::new(SingleFieldAction::new(field, tokenizer)))
    }

    /// Encrypt `field`
    pub fn encrypt(self, field: impl Into<String>, encryptor: Encryptor) -> Self {
        self.action(Box::new(SingleFieldAction::new(field, encryptor)))
    }

    /// Encrypt `field` with an AES key; an invalid key fails `build`
    pub fn encrypt_symmetric(self, field: impl Into<String>, key: &[u8]) -> Self {
        match Encryptor::aes(key) {
            Ok(encryptor) => self.encrypt(field, encryptor),
            Err(e) => self.defer(e),
        }
    }

    /// Encrypt `field` with an RSA public key
    pub fn encrypt_asymmetric(self, field: impl Into<String>, public_key: RsaPublicKey) -> Self {
        self.encrypt(field, Encryptor::rsa(public_key))
    }

    /// Audit `field` without changing it. Each application reports the
    /// field's current value as both before and after.
    pub fn audit(self, field: impl Into<String>, sink: Arc<dyn AuditSink>) -> Self {
        self.audited(field, Box::new(CompositeAction::empty()), sink)
    }

    /// Mask `field` and audit the change
    pub fn mask_with_audit(
        self,
        field: impl Into<String>,
        strategy: MaskStrategy,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        let field = field.into();
        let action = SingleFieldAction::new(field.clone(), strategy);
        self.audited(field, Box::new(action), sink)
    }

    /// Tokenize `field` and audit the change
    pub fn tokenize_with_audit(
        self,
        field: impl Into<String>,
        tokenizer: Tokenizer,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        let field = field.into();
        let action = SingleFieldAction::new(field.clone(), tokenizer);
        self.audited(field, Box::new(action), sink)
    }

    /// Encrypt `field` and audit the change
    pub fn encrypt_with_audit(
        self,
        field: impl Into<String>,
        encryptor: Encryptor,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        let field = field.into();
        let action = SingleFieldAction::new(field.clone(), encryptor);
        self.audited(field, Box::new(action), sink)
    }

    /// AES-encrypt `field` and audit the change
    pub fn encrypt_symmetric_with_audit(
        self,
        field: impl Into<String>,
        key: &[u8],
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        match Encryptor::aes(key) {
            Ok(encryptor) => self.encrypt_with_audit(field, encryptor, sink),
            Err(e) => self.defer(e),
        }
    }

    /// RSA-encrypt `field` and audit the change
    pub fn encrypt_asymmetric_with_audit(
        self,
        field: impl Into<String>,
        public_key: RsaPublicKey,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        self.encrypt_with_audit(field, Encryptor::rsa(public_key), sink)
    }

    /// Number of steps added so far
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no steps have been added
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Freeze the accumulated steps. Returns the first deferred
    /// construction error, if any.
    pub fn build(self) -> Result<Pipeline> {
        if let Some(err) = self.error {
            return Err(err);
        }

        info!(steps = self.actions.len(), "Pipeline built");
        Ok(Pipeline {
            root: CompositeAction::new(self.actions),
        })
    }

    fn defer(mut self, err: Error) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }
}

/// Immutable, ordered sequence of actions
#[derive(Debug)]
pub struct Pipeline {
    root: CompositeAction,
}

impl Pipeline {
    /// Start a new builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Apply every step to a record in place
    pub fn apply(&self, record: &mut Record) -> Result<()> {
        let start = Instant::now();
        let result = self.root.apply(record);
        let elapsed = start.elapsed();

        metrics::histogram!("fieldguard_pipeline_latency_us").record(elapsed.as_micros() as f64);
        match &result {
            Ok(()) => metrics::counter!("fieldguard_records_processed_total").increment(1),
            Err(e) => {
                metrics::counter!("fieldguard_record_failures_total").increment(1);
                debug!(error = %e, "pipeline failed on record");
            }
        }

        result
    }

    /// Apply to each record in turn, stopping at the first failure.
    /// Returns the index of the failing record alongside its error.
    pub fn apply_batch(&self, records: &mut [Record]) -> std::result::Result<(), (usize, Error)> {
        for (index, record) in records.iter_mut().enumerate() {
            self.apply(record).map_err(|e| (index, e))?;
        }
        Ok(())
    }

    /// Number of top-level steps
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether the pipeline has no steps
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl Action for Pipeline {
    fn apply(&self, record: &mut Record) -> Result<()> {
        Pipeline::apply(self, record)
    }

    fn descriptor(&self) -> ActionDescriptor {
        self.root.descriptor()
    }
}
