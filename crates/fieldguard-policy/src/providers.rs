//! Built-in action providers
//!
//! Each provider reads a flat config object whose `strategy` (or
//! `algorithm`) key selects the variant:
//!
//! ```yaml
//! action: mask
//! config:
//!   field: email
//!   strategy: regex
//!   pattern: "^.(?P<mask>[^@]*).@"
//! ```

use crate::action::{Action, SingleFieldAction};
use crate::registry::{ActionConfig, ActionProvider};
use fieldguard_core::{Error, Result};
use fieldguard_transform::{CharClass, Encryptor, MaskStrategy, Tokenizer, DEFAULT_MASK_CHAR};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;

/// Mask provider config
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MaskConfig {
    Regex {
        field: String,
        pattern: String,
        #[serde(default = "default_mask_char")]
        mask_char: char,
    },
    Partial {
        field: String,
        #[serde(default)]
        prefix: usize,
        #[serde(default)]
        suffix: usize,
        #[serde(default = "default_mask_char")]
        mask_char: char,
    },
    CharClass {
        field: String,
        classes: Vec<CharClass>,
        #[serde(default = "default_mask_char")]
        mask_char: char,
    },
}

/// Tokenize provider config
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TokenizeConfig {
    Uuid {
        field: String,
    },
    Hash {
        field: String,
        #[serde(default)]
        salt: String,
    },
    Numeric {
        field: String,
        #[serde(default = "default_token_length")]
        length: usize,
    },
}

/// Encrypt provider config
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum EncryptConfig {
    /// `key` is base64 of a 16, 24 or 32 byte key
    Aes { field: String, key: String },

    /// Exactly one of `public_key` (PEM text) or `public_key_file`
    Rsa {
        field: String,
        public_key: Option<String>,
        public_key_file: Option<PathBuf>,
    },
}

fn default_mask_char() -> char {
    DEFAULT_MASK_CHAR
}

fn default_token_length() -> usize {
    12
}

/// Masking provider
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskProvider;

impl ActionProvider for MaskProvider {
    fn name(&self) -> &str {
        "mask"
    }

    fn description(&self) -> String {
        "Mask a field by regex, prefix/suffix, or character class".to_string()
    }

    fn supported_config_keys(&self) -> &'static [&'static str] {
        &["field", "strategy", "pattern", "prefix", "suffix", "classes", "mask_char"]
    }

    fn create_action(&self, config: &ActionConfig) -> Result<Box<dyn Action>> {
        let (field, strategy) = match parse_config::<MaskConfig>(self.name(), config)? {
            MaskConfig::Regex {
                field,
                pattern,
                mask_char,
            } => (field, MaskStrategy::regex(&pattern, mask_char)?),
            MaskConfig::Partial {
                field,
                prefix,
                suffix,
                mask_char,
            } => (field, MaskStrategy::partial(prefix, suffix, mask_char)),
            MaskConfig::CharClass {
                field,
                classes,
                mask_char,
            } => {
                if classes.is_empty() {
                    return Err(Error::invalid_config(self.name(), "classes must not be empty"));
                }
                (field, MaskStrategy::char_class(classes, mask_char))
            }
        };
        Ok(Box::new(SingleFieldAction::new(field, strategy)))
    }
}

/// Tokenization provider
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizeProvider;

impl ActionProvider for TokenizeProvider {
    fn name(&self) -> &str {
        "tokenize"
    }

    fn description(&self) -> String {
        "Replace a field with a UUID, salted hash, or numeric token".to_string()
    }

    fn supported_config_keys(&self) -> &'static [&'static str] {
        &["field", "strategy", "salt", "length"]
    }

    fn create_action(&self, config: &ActionConfig) -> Result<Box<dyn Action>> {
        let (field, tokenizer) = match parse_config::<TokenizeConfig>(self.name(), config)? {
            TokenizeConfig::Uuid { field } => (field, Tokenizer::uuid()),
            TokenizeConfig::Hash { field, salt } => (field, Tokenizer::hash(salt)),
            TokenizeConfig::Numeric { field, length } => (field, Tokenizer::numeric(length)?),
        };
        Ok(Box::new(SingleFieldAction::new(field, tokenizer)))
    }
}

/// Encryption provider
#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptProvider;

impl ActionProvider for EncryptProvider {
    fn name(&self) -> &str {
        "encrypt"
    }

    fn description(&self) -> String {
        "Encrypt a field with AES (base64 key) or an RSA public key".to_string()
    }

    fn supported_config_keys(&self) -> &'static [&'static str] {
        &["field", "algorithm", "key", "public_key", "public_key_file"]
    }

    fn create_action(&self, config: &ActionConfig) -> Result<Box<dyn Action>> {
        let (field, encryptor) = match parse_config::<EncryptConfig>(self.name(), config)? {
            EncryptConfig::Aes { field, key } => (field, Encryptor::aes_base64(&key)?),
            EncryptConfig::Rsa {
                field,
                public_key,
                public_key_file,
            } => {
                let pem = match (public_key, public_key_file) {
                    (Some(pem), None) => pem,
                    (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
                        Error::invalid_config(
                            self.name(),
                            format!("cannot read {}: {}", path.display(), e),
                        )
                    })?,
                    _ => {
                        return Err(Error::invalid_config(
                            self.name(),
                            "exactly one of public_key or public_key_file is required",
                        ))
                    }
                };
                (field, Encryptor::rsa_pem(&pem)?)
            }
        };
        Ok(Box::new(SingleFieldAction::new(field, encryptor)))
    }
}

fn parse_config<T: DeserializeOwned>(name: &str, config: &ActionConfig) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(config.clone()))
        .map_err(|e| Error::invalid_config(name, e.to_string()))
}
