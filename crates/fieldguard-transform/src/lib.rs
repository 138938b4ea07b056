//! FieldGuard Transforms
//!
//! Value-level data-protection strategies. Each strategy converts one field
//! value and never sees the rest of the record.
//!
//! Strategies are grouped into three families:
//! - Mask: regex, partial (prefix/suffix), character class
//! - Tokenize: random UUID, salted SHA-256, random numeric
//! - Encrypt: AES-ECB (symmetric), RSA PKCS#1 v1.5 (asymmetric, encrypt-only)
//!
//! All strategies are immutable after construction and safe to share
//! between threads.

pub mod encrypt;
pub mod mask;
pub mod tokenize;
pub mod transform;

pub use encrypt::{generate_aes_key, AesEncryptor, Encryptor, RsaEncryptor};
pub use mask::{CharClass, CharClassMask, MaskStrategy, PartialMask, RegexMask, DEFAULT_MASK_CHAR};
pub use tokenize::Tokenizer;
pub use transform::{StrategyDescriptor, Transform, TransformKind};

/// Re-exported so callers can build RSA keys without a direct dependency
pub use rsa::RsaPublicKey;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::encrypt::Encryptor;
    pub use crate::mask::{CharClass, MaskStrategy};
    pub use crate::tokenize::Tokenizer;
    pub use crate::transform::{StrategyDescriptor, Transform, TransformKind};
}
