//! The field codec: versioned encoder and fallback-chain decoder.
//!
//! # Stored value format
//!
//! ```text
//! base64( [ 0x01 ][ nonce: 12 bytes ][ AES-256-GCM ciphertext || tag ] )
//! ```
//!
//! # Decoding
//!
//! [`FieldCodec::decrypt`] never fails on a bad value. Rows written by every
//! earlier codec generation (plain text, base64 text, AES-CBC, secretbox)
//! coexist with current rows, so a value that does not open as version 1 is
//! passed down the [`chain`] until some step accepts it. A truly corrupted
//! value comes back as the stored string itself, and a warning is logged.
//! [`FieldCodec::inspect`] tells such values apart ([`Format::Undecryptable`]
//! when the version marker is present) so batch writers can leave them alone.

pub mod chain;
pub mod plaintext;

pub use chain::{Decoded, Format};
pub use plaintext::is_probably_plaintext;

use std::fmt;

use aes::Aes256;
use aes_gcm::Aes256Gcm;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto_secretbox::XSalsa20Poly1305;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::crypto::{cipher, legacy, legacy_cbc, CipherError};
use crate::error::Error;
use crate::key::{self, EncryptionKey};

static SHARED: OnceCell<FieldCodec> = OnceCell::new();

/// Encrypts and decrypts individual string fields under one key.
///
/// Construct one per process with [`FieldCodec::from_env`] (or use
/// [`FieldCodec::shared`]) and pass it by reference. Tests inject a throwaway
/// key through [`FieldCodec::new`].
pub struct FieldCodec {
    pub(crate) current: Aes256Gcm,
    pub(crate) cbc: Aes256,
    pub(crate) legacy: XSalsa20Poly1305,
}

impl FieldCodec {
    /// Import `key` into the current and legacy ciphers.
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            current: cipher::build_cipher(key),
            cbc: legacy_cbc::build_cipher(key),
            legacy: legacy::build_cipher(key),
        }
    }

    /// Build a codec from `ENCRYPTION_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a configuration or key error. Callers must treat it as fatal.
    pub fn from_env() -> Result<Self, Error> {
        let key = key::load_from_env()?;
        info!("encryption key loaded");
        Ok(Self::new(&key))
    }

    /// The process-wide codec, built from the environment on first use.
    ///
    /// Concurrent first callers block until the single initialisation
    /// finishes; every caller then sees the same instance.
    ///
    /// # Errors
    ///
    /// Returns the error from [`FieldCodec::from_env`] if the key cannot be
    /// loaded. A later call retries the load.
    pub fn shared() -> Result<&'static FieldCodec, Error> {
        SHARED.get_or_try_init(Self::from_env)
    }

    /// Encrypt `plaintext` into a base64 version-1 blob.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError`] if the nonce cannot be generated or the AEAD
    /// operation fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let framed = cipher::seal(&self.current, plaintext.as_bytes())?;
        Ok(STANDARD.encode(framed))
    }

    /// Decrypt a stored value written by any codec generation.
    pub fn decrypt(&self, blob: &str) -> String {
        self.inspect(blob).plaintext
    }

    /// Decrypt a stored value and report which format it matched.
    pub fn inspect(&self, blob: &str) -> Decoded {
        chain::decode(self, blob)
    }
}

impl fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldCodec([REDACTED])")
    }
}
