//! Configuration loading for the codec.
//!
//! Values are read from environment variables. The only required value is
//! `ENCRYPTION_KEY`; its absence is reported as [`KeyError::Missing`] when the
//! key is loaded so callers can stop the process with a precise message.

use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::key::{EncryptionKey, KeyError};

/// Codec configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded 32-byte symmetric key. **Required.**
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be read or deserialised.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build codec configuration from environment")?;

        cfg.try_deserialize()
            .context("failed to deserialise codec configuration")
    }

    /// Decode and validate the configured key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Missing`] if `ENCRYPTION_KEY` is unset or blank, and
    /// any error from [`EncryptionKey::from_base64`] otherwise.
    pub fn key(&self) -> Result<EncryptionKey, KeyError> {
        match self.encryption_key.as_deref().map(str::trim) {
            None | Some("") => Err(KeyError::Missing),
            Some(encoded) => EncryptionKey::from_base64(encoded),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.encryption_key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config").field("encryption_key", &key).finish()
    }
}
