//! Crate-level error type.

use common::StoreError;
use thiserror::Error;

use crate::crypto::CipherError;
use crate::key::KeyError;

/// Errors surfaced by the codec and the migration utility.
///
/// [`Error::Config`] and [`Error::Key`] are configuration errors: the process
/// must not keep serving with them. Decoding a stored value never produces an
/// error at all.
#[derive(Debug, Error)]
pub enum Error {
    /// The environment could not be read into a configuration.
    #[error("configuration invalid: {0:#}")]
    Config(anyhow::Error),

    /// The configured key is missing or malformed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Encryption failed on the write path.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// The row store could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_errors_display_transparently() {
        let e = Error::from(KeyError::InvalidLength(31));
        assert_eq!(e.to_string(), KeyError::InvalidLength(31).to_string());
    }

    #[test]
    fn config_error_includes_context_chain() {
        let inner = anyhow::anyhow!("missing env").context("failed to build");
        let e = Error::Config(inner);
        let msg = e.to_string();
        assert!(msg.contains("failed to build"));
        assert!(msg.contains("missing env"));
    }
}
