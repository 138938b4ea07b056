//! Encryption strategies
//!
//! Ciphertext is returned as standard base64 so it fits back into a
//! string-valued record field.
//!
//! AES runs in ECB mode with PKCS#7 padding. ECB has no IV, so the same
//! plaintext under the same key always yields the same ciphertext. This
//! makes encrypted fields joinable but leaks equality between records.

use crate::transform::{StrategyDescriptor, Transform};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fieldguard_core::{Error, Result};
use rand::RngCore;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use tracing::debug;

type Aes128EcbEnc = ecb::Encryptor<aes::Aes128>;
type Aes192EcbEnc = ecb::Encryptor<aes::Aes192>;
type Aes256EcbEnc = ecb::Encryptor<aes::Aes256>;
type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;
type Aes192EcbDec = ecb::Decryptor<aes::Aes192>;
type Aes256EcbDec = ecb::Decryptor<aes::Aes256>;

/// Configured encryption strategy
#[derive(Debug, Clone)]
pub enum Encryptor {
    /// Symmetric AES-ECB
    Aes(AesEncryptor),

    /// Asymmetric RSA, encrypt-only
    Rsa(RsaEncryptor),
}

impl Encryptor {
    /// AES encryptor from raw key bytes (16, 24 or 32 bytes)
    pub fn aes(key: &[u8]) -> Result<Self> {
        AesEncryptor::new(key).map(Self::Aes)
    }

    /// AES encryptor from a base64-encoded key
    pub fn aes_base64(key: &str) -> Result<Self> {
        AesEncryptor::from_base64(key).map(Self::Aes)
    }

    /// RSA encryptor from a public key
    pub fn rsa(public_key: RsaPublicKey) -> Self {
        Self::Rsa(RsaEncryptor::new(public_key))
    }

    /// RSA encryptor from an SPKI PEM public key
    pub fn rsa_pem(pem: &str) -> Result<Self> {
        RsaEncryptor::from_public_key_pem(pem).map(Self::Rsa)
    }

    /// Encrypt a value and return base64 ciphertext
    pub fn encrypt(&self, plain: &str) -> Result<String> {
        let cipher = match self {
            Self::Aes(e) => e.encrypt_bytes(plain.as_bytes())?,
            Self::Rsa(e) => e.encrypt_bytes(plain.as_bytes())?,
        };
        Ok(STANDARD.encode(cipher))
    }
}

impl Transform for Encryptor {
    fn transform(&self, value: &str) -> Result<String> {
        self.encrypt(value)
    }

    fn descriptor(&self) -> StrategyDescriptor {
        match self {
            Self::Aes(e) => StrategyDescriptor::Aes {
                key_bits: e.key_bits(),
            },
            Self::Rsa(e) => StrategyDescriptor::Rsa {
                key_bits: e.key_bits(),
            },
        }
    }
}

/// AES-ECB with PKCS#7 padding
#[derive(Clone)]
pub struct AesEncryptor {
    key: Vec<u8>,
}

impl AesEncryptor {
    /// Create from raw key bytes
    pub fn new(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 | 24 | 32 => Ok(Self { key: key.to_vec() }),
            n => Err(Error::validation(format!(
                "AES key must be 16, 24 or 32 bytes, got {}",
                n
            ))),
        }
    }

    /// Create from a base64-encoded key
    pub fn from_base64(key: &str) -> Result<Self> {
        let decoded = STANDARD
            .decode(key.trim())
            .map_err(|e| Error::validation(format!("AES key is not valid base64: {}", e)))?;
        Self::new(&decoded)
    }

    /// Key size in bits
    pub fn key_bits(&self) -> usize {
        self.key.len() * 8
    }

    /// Encrypt raw bytes
    pub fn encrypt_bytes(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let key = self.key.as_slice();
        let cipher = match key.len() {
            16 => Aes128EcbEnc::new_from_slice(key).map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plain)),
            24 => Aes192EcbEnc::new_from_slice(key).map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plain)),
            _ => Aes256EcbEnc::new_from_slice(key).map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plain)),
        }
        .map_err(|e| Error::transform(format!("AES key rejected: {}", e)))?;

        debug!(key_bits = self.key_bits(), bytes = plain.len(), "AES encrypted value");
        Ok(cipher)
    }

    /// Decrypt raw bytes
    pub fn decrypt_bytes(&self, cipher: &[u8]) -> Result<Vec<u8>> {
        let key = self.key.as_slice();
        let plain = match key.len() {
            16 => Aes128EcbDec::new_from_slice(key).map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(cipher)),
            24 => Aes192EcbDec::new_from_slice(key).map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(cipher)),
            _ => Aes256EcbDec::new_from_slice(key).map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(cipher)),
        }
        .map_err(|e| Error::transform(format!("AES key rejected: {}", e)))?;

        plain.map_err(|e| Error::transform(format!("AES decryption failed: {}", e)))
    }

    /// Decrypt base64 ciphertext produced by [`Encryptor::encrypt`]
    pub fn decrypt(&self, cipher_b64: &str) -> Result<String> {
        let cipher = STANDARD
            .decode(cipher_b64)
            .map_err(|e| Error::transform(format!("ciphertext is not valid base64: {}", e)))?;
        let plain = self.decrypt_bytes(&cipher)?;
        String::from_utf8(plain).map_err(|e| Error::transform(format!("plaintext is not UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for AesEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesEncryptor")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

/// RSA with PKCS#1 v1.5 padding, public key only
#[derive(Debug, Clone)]
pub struct RsaEncryptor {
    public_key: RsaPublicKey,
}

impl RsaEncryptor {
    /// Create from a public key
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }

    /// Load an SPKI ("BEGIN PUBLIC KEY") PEM
    pub fn from_public_key_pem(pem: &str) -> Result<Self> {
        let public_key = RsaPublicKey::from_public_key_pem(pem.trim())
            .map_err(|e| Error::validation(format!("invalid RSA public key: {}", e)))?;
        Ok(Self::new(public_key))
    }

    /// Modulus size in bits
    pub fn key_bits(&self) -> usize {
        self.public_key.size() * 8
    }

    /// Encrypt raw bytes; fails if the message exceeds the key's capacity
    pub fn encrypt_bytes(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();
        self.public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, plain)
            .map_err(|e| Error::transform(format!("RSA encryption failed: {}", e)))
    }
}

/// Generate a random AES key of 128, 192 or 256 bits
pub fn generate_aes_key(bits: usize) -> Result<Vec<u8>> {
    if !matches!(bits, 128 | 192 | 256) {
        return Err(Error::validation(format!(
            "AES key size must be 128, 192 or 256 bits, got {}",
            bits
        )));
    }

    let mut key = vec![0u8; bits / 8];
    rand::thread_rng().fill_bytes(&mut key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::RsaPrivateKey;

    fn rsa_keypair() -> (RsaPrivateKey, RsaPublicKey) {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let public = RsaPublicKey::from(&private);
        (private, public)
    }

    #[test]
    fn test_aes_reproducible_and_decrypts() {
        let key = generate_aes_key(128).unwrap();
        let aes = AesEncryptor::new(&key).unwrap();
        let encryptor = Encryptor::Aes(aes.clone());

        let first = encryptor.encrypt("4111-1111-1111-1111").unwrap();
        let second = encryptor.encrypt("4111-1111-1111-1111").unwrap();

        // ECB without IV: identical input, identical output
        assert_eq!(first, second);
        assert_ne!(first, "4111-1111-1111-1111");
        assert_eq!(aes.decrypt(&first).unwrap(), "4111-1111-1111-1111");
    }

    #[test]
    fn test_aes_key_sizes() {
        for bits in [128, 192, 256] {
            let key = generate_aes_key(bits).unwrap();
            let encryptor = Encryptor::aes(&key).unwrap();
            assert_eq!(encryptor.descriptor(), StrategyDescriptor::Aes { key_bits: bits });
            assert!(encryptor.encrypt("secret").is_ok());
        }
    }

    #[test]
    fn test_aes_bad_key_rejected() {
        assert!(matches!(Encryptor::aes(b"short"), Err(Error::Validation(_))));
        assert!(Encryptor::aes_base64("not base64!!").is_err());
        assert!(generate_aes_key(100).is_err());
    }

    #[test]
    fn test_aes_base64_key() {
        let key = generate_aes_key(256).unwrap();
        let encryptor = Encryptor::aes_base64(&STANDARD.encode(&key)).unwrap();
        let direct = Encryptor::aes(&key).unwrap();
        assert_eq!(encryptor.encrypt("x").unwrap(), direct.encrypt("x").unwrap());
    }

    #[test]
    fn test_aes_debug_hides_key() {
        let aes = AesEncryptor::new(&[7u8; 16]).unwrap();
        assert!(!format!("{:?}", aes).contains('7'));
    }

    #[test]
    fn test_rsa_round_trip_with_private_key() {
        let (private, public) = rsa_keypair();
        let encryptor = Encryptor::rsa(public);

        let cipher = encryptor.encrypt("user@example.com").unwrap();
        let bytes = STANDARD.decode(&cipher).unwrap();
        let plain = private.decrypt(Pkcs1v15Encrypt, &bytes).unwrap();

        assert_eq!(plain, b"user@example.com");
        assert_eq!(encryptor.descriptor(), StrategyDescriptor::Rsa { key_bits: 1024 });
    }

    #[test]
    fn test_rsa_from_pem() {
        let (_, public) = rsa_keypair();
        let pem = public.to_public_key_pem(LineEnding::LF).unwrap();

        let encryptor = Encryptor::rsa_pem(&pem).unwrap();
        assert!(encryptor.encrypt("hello").is_ok());
        assert!(Encryptor::rsa_pem("-----BEGIN PUBLIC KEY-----\nbad\n-----END PUBLIC KEY-----").is_err());
    }

    #[test]
    fn test_rsa_message_too_long_is_transform_error() {
        let (_, public) = rsa_keypair();
        let encryptor = Encryptor::rsa(public);

        let err = encryptor.encrypt(&"x".repeat(200)).unwrap_err();
        assert!(matches!(err, Error::Transform { .. }));
    }
}
