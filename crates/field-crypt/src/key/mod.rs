//! Symmetric key loading.
//!
//! # Lifecycle
//!
//! 1. [`load_from_env`] reads `ENCRYPTION_KEY`, base64-decodes it and checks
//!    that exactly [`KEY_LEN`](crate::crypto::KEY_LEN) bytes came out.
//! 2. The key is handed to [`FieldCodec::new`](crate::codec::FieldCodec::new),
//!    which imports it into the cipher objects once.
//! 3. The process-wide codec keeps those objects until exit; there is no
//!    teardown and no rotation.
//!
//! # Security invariants
//!
//! - Key bytes are never logged, formatted, or returned to callers.
//! - A key of the wrong size is rejected, never truncated or padded.

pub mod material;

pub use material::{EncryptionKey, KeyError};

use crate::config::Config;
use crate::error::Error;

/// Load the key from the process environment.
///
/// # Errors
///
/// Returns [`Error::Config`] if the environment cannot be read and
/// [`Error::Key`] if the key is missing or malformed.
pub fn load_from_env() -> Result<EncryptionKey, Error> {
    let cfg = Config::from_env().map_err(Error::Config)?;
    Ok(cfg.key()?)
}
