//! Field-level encryption at rest for sensitive bookmark and folder columns.
//!
//! The whole boundary is two calls:
//!
//! - [`encrypt`] turns a plaintext into an opaque base64 blob for a text column.
//! - [`decrypt`] turns any value ever stored in such a column (current blobs,
//!   legacy blobs, or plaintext that was never encrypted) back into plaintext.
//!
//! Both use the process-wide [`FieldCodec`], built from `ENCRYPTION_KEY` on
//! first use. Services that prefer explicit wiring construct a
//! [`FieldCodec`] at startup and pass it by reference instead.
//!
//! The [`migrate`] module rewrites every stored value into the current format.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod key;
pub mod migrate;

pub use codec::{is_probably_plaintext, Decoded, FieldCodec, Format};
pub use error::Error;
pub use key::{EncryptionKey, KeyError};

/// Encrypt `plaintext` with the process-wide codec.
///
/// # Errors
///
/// Returns [`Error::Config`] or [`Error::Key`] if the key cannot be loaded, and
/// [`Error::Cipher`] if encryption fails.
pub fn encrypt(plaintext: &str) -> Result<String, Error> {
    Ok(FieldCodec::shared()?.encrypt(plaintext)?)
}

/// Decrypt a stored value with the process-wide codec.
///
/// # Errors
///
/// Only fails when the key cannot be loaded. An unreadable stored value is
/// returned unchanged rather than reported.
pub fn decrypt(blob: &str) -> Result<String, Error> {
    Ok(FieldCodec::shared()?.decrypt(blob))
}
