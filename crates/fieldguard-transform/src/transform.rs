//! Transform trait and strategy descriptors

use crate::mask::CharClass;
use fieldguard_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for all field-value transforms.
///
/// Implementations are configured once and hold no per-call mutable state,
/// so a single instance can be invoked from many threads at once.
pub trait Transform: Send + Sync + Debug {
    /// Convert one non-null field value
    fn transform(&self, value: &str) -> Result<String>;

    /// Describe this transform without exposing secrets
    fn descriptor(&self) -> StrategyDescriptor;

    /// Nullable form: `None` passes through untouched
    fn transform_nullable(&self, value: Option<&str>) -> Result<Option<String>> {
        value.map(|v| self.transform(v)).transpose()
    }
}

/// Family a transform belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Mask,
    Tokenize,
    Encrypt,
    Custom,
}

/// Serializable description of a configured strategy.
///
/// Salts and keys never appear; only shape parameters do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyDescriptor {
    /// Regex mask
    Regex { pattern: String, mask_char: char },

    /// Prefix/suffix-preserving mask
    Partial {
        prefix: usize,
        suffix: usize,
        mask_char: char,
    },

    /// Character-class mask
    CharClass {
        classes: Vec<CharClass>,
        mask_char: char,
    },

    /// Random UUID token
    Uuid,

    /// Salted SHA-256 token
    Hash,

    /// Random fixed-length numeric token
    Numeric { length: usize },

    /// AES-ECB encryption
    Aes { key_bits: usize },

    /// RSA PKCS#1 v1.5 encryption
    Rsa { key_bits: usize },

    /// User-supplied transform
    Custom { name: String },
}

impl StrategyDescriptor {
    /// Transform family this strategy belongs to
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Regex { .. } | Self::Partial { .. } | Self::CharClass { .. } => {
                TransformKind::Mask
            }
            Self::Uuid | Self::Hash | Self::Numeric { .. } => TransformKind::Tokenize,
            Self::Aes { .. } | Self::Rsa { .. } => TransformKind::Encrypt,
            Self::Custom { .. } => TransformKind::Custom,
        }
    }
}
