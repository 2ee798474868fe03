use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::error::Error;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_ENV: &str = "CEAC_ENCRYPTION_KEY";

/// AES-256 key for protecting locally held field values.
///
/// There is no built-in fallback key: callers provision one explicitly,
/// from the environment or by generating and storing their own.
#[derive(Clone)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Generates a random key.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            bytes: rand::rng().random(),
        }
    }

    /// Parses a hex-encoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the hex is invalid or not 32 bytes long.
    pub fn from_hex(key_hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(key_hex.trim())
            .map_err(|e| Error::Config(format!("invalid key hex: {e}")))?;
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::Config(format!(
                "invalid key length: expected {KEY_LEN}, got {}",
                b.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Reads the key from `CEAC_ENCRYPTION_KEY` (64 hex characters).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is missing or malformed.
    pub fn from_env() -> Result<Self, Error> {
        let raw = std::env::var(KEY_ENV)
            .map_err(|_| Error::Config(format!("{KEY_ENV} is required")))?;
        let key = Self::from_hex(&raw)?;
        tracing::info!(fingerprint = %key.fingerprint(), "Encryption key loaded");
        Ok(key)
    }

    /// Short, non-reversible identifier safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(&Sha256::digest(self.bytes)[..8])
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Ciphertext plus the nonce needed to open it, both hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub encrypted: String,
    pub iv: String,
    /// Milliseconds since the Unix epoch at encryption time.
    pub timestamp: i64,
}

/// Serializes `data` to JSON and seals it under `key`.
///
/// # Errors
///
/// Returns [`Error::Crypto`] if serialization or encryption fails.
pub fn encrypt_data<T: Serialize>(key: &EncryptionKey, data: &T) -> Result<EncryptedPayload, Error> {
    let plaintext = serde_json::to_vec(data).map_err(|e| {
        tracing::error!(error = %e, "Encryption input not serializable");
        Error::Crypto("encrypt data")
    })?;

    let nonce_bytes: [u8; NONCE_LEN] = rand::rng().random();
    let cipher = Aes256Gcm::new(GenericArray::from_slice(&key.bytes));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
        .map_err(|e| {
            tracing::error!(error = %e, "Encryption failed");
            Error::Crypto("encrypt data")
        })?;

    let timestamp = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    Ok(EncryptedPayload {
        encrypted: hex::encode(ciphertext),
        iv: hex::encode(nonce_bytes),
        timestamp: i64::try_from(timestamp).unwrap_or(i64::MAX),
    })
}

/// Opens a payload produced by [`encrypt_data`] and deserializes it.
///
/// # Errors
///
/// Returns [`Error::Crypto`] if the payload is malformed, was sealed under a
/// different key, was tampered with, or does not deserialize as `T`.
pub fn decrypt_data<T: DeserializeOwned>(
    key: &EncryptionKey,
    payload: &EncryptedPayload,
) -> Result<T, Error> {
    let fail = |reason: &str| {
        tracing::error!(reason, "Decryption failed");
        Error::Crypto("decrypt data")
    };

    let nonce_bytes = hex::decode(&payload.iv).map_err(|_| fail("iv is not hex"))?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(fail("iv has wrong length"));
    }
    let ciphertext = hex::decode(&payload.encrypted).map_err(|_| fail("ciphertext is not hex"))?;

    let cipher = Aes256Gcm::new(GenericArray::from_slice(&key.bytes));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| fail("authentication failed"))?;

    serde_json::from_slice(&plaintext).map_err(|_| fail("plaintext is not the expected shape"))
}
