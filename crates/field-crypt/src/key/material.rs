//! [`EncryptionKey`]: validated, zeroizing holder for the raw key bytes.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use zeroize::Zeroize;

use crate::crypto::KEY_LEN;

/// Errors produced while loading the key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// `ENCRYPTION_KEY` is not set.
    #[error("ENCRYPTION_KEY is required and must not be empty")]
    Missing,

    /// The configured value is not valid base64.
    #[error("ENCRYPTION_KEY is not valid base64")]
    InvalidBase64(#[source] base64::DecodeError),

    /// The decoded key material has an unexpected length.
    #[error("ENCRYPTION_KEY has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// The memory is overwritten with zeroes when the value is dropped.
#[derive(Clone)]
pub struct EncryptionKey(Box<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if the slice is not [`KEY_LEN`] bytes.
    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self, KeyError> {
        if key_bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(key_bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(key_bytes);
        Ok(Self(buf))
    }

    /// Decode a standard-alphabet base64 string into a key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidBase64`] if decoding fails and
    /// [`KeyError::InvalidLength`] if the decoded bytes are not [`KEY_LEN`] long.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let mut decoded = STANDARD
            .decode(encoded.trim())
            .map_err(KeyError::InvalidBase64)?;
        let key = Self::from_bytes(&decoded);
        decoded.zeroize();
        key
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("EncryptionKey([REDACTED])")
    }
}
