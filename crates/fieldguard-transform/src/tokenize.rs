//! Tokenization strategies

use crate::transform::{StrategyDescriptor, Transform};
use fieldguard_core::{Error, Result};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Replaces a value with a surrogate token
#[derive(Clone)]
pub enum Tokenizer {
    /// Fresh random UUID per call; the input is ignored
    Uuid,

    /// Lowercase hex SHA-256 of `salt || input`; deterministic per salt
    Hash { salt: String },

    /// Random decimal string of fixed length
    Numeric { length: usize },
}

impl Tokenizer {
    /// Random UUID tokenizer
    pub fn uuid() -> Self {
        Self::Uuid
    }

    /// Salted hash tokenizer
    pub fn hash(salt: impl Into<String>) -> Self {
        Self::Hash { salt: salt.into() }
    }

    /// Numeric tokenizer; `length` must be at least 1
    pub fn numeric(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(Error::validation("numeric token length must be at least 1"));
        }
        Ok(Self::Numeric { length })
    }

    /// Produce a token for `input`
    pub fn tokenize(&self, input: &str) -> String {
        match self {
            Self::Uuid => uuid::Uuid::new_v4().to_string(),
            Self::Hash { salt } => {
                let mut hasher = Sha256::new();
                hasher.update(salt.as_bytes());
                hasher.update(input.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            Self::Numeric { length } => {
                let mut rng = rand::thread_rng();
                (0..*length)
                    .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                    .collect()
            }
        }
    }
}

// Keep the salt out of debug output
impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uuid => f.write_str("Uuid"),
            Self::Hash { .. } => f.debug_struct("Hash").finish_non_exhaustive(),
            Self::Numeric { length } => f.debug_struct("Numeric").field("length", length).finish(),
        }
    }
}

impl Transform for Tokenizer {
    fn transform(&self, value: &str) -> Result<String> {
        Ok(self.tokenize(value))
    }

    fn descriptor(&self) -> StrategyDescriptor {
        match self {
            Self::Uuid => StrategyDescriptor::Uuid,
            Self::Hash { .. } => StrategyDescriptor::Hash,
            Self::Numeric { length } => StrategyDescriptor::Numeric { length: *length },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uuid_format() {
        let token = Tokenizer::uuid().tokenize("ignored");
        assert_eq!(token.len(), 36);
        assert!(uuid::Uuid::parse_str(&token).is_ok());
        assert_ne!(token, Tokenizer::uuid().tokenize("ignored"));
    }

    #[test]
    fn test_hash_known_digest() {
        // sha256("salt" + "value")
        let token = Tokenizer::hash("salt").tokenize("value");
        let mut hasher = Sha256::new();
        hasher.update(b"saltvalue");
        assert_eq!(token, format!("{:x}", hasher.finalize()));
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_numeric_length() {
        let token = Tokenizer::numeric(6).unwrap().tokenize("123-45-6789");
        assert_eq!(token.len(), 6);
        assert!(token.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_numeric_zero_length_rejected() {
        assert!(Tokenizer::numeric(0).is_err());
    }

    #[test]
    fn test_debug_hides_salt() {
        let debug = format!("{:?}", Tokenizer::hash("s3cret"));
        assert!(!debug.contains("s3cret"));
    }

    proptest! {
        #[test]
        fn prop_hash_deterministic(input in ".{0,64}", salt in "[a-z]{1,12}") {
            let tokenizer = Tokenizer::hash(salt.clone());
            prop_assert_eq!(tokenizer.tokenize(&input), tokenizer.tokenize(&input));

            let other = Tokenizer::hash(format!("{salt}x"));
            prop_assert_ne!(tokenizer.tokenize(&input), other.tokenize(&input));
        }
    }
}
