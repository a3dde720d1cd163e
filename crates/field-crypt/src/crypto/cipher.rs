//! AES-256-GCM sealing and opening of version-1 field buffers.
//!
//! A fresh 96-bit nonce is drawn from the OS CSPRNG for every call. **Never**
//! derive the nonce from the input or a process-local counter: GCM nonce reuse
//! under one key breaks both confidentiality and authentication.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use thiserror::Error;

use crate::key::EncryptionKey;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Leading byte of every version-1 buffer.
pub const VERSION_AES_GCM: u8 = 0x01;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The OS random number generator could not produce a nonce.
    #[error("entropy source failure: {0}")]
    Entropy(String),

    /// AEAD encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// A CBC buffer decrypted to invalid PKCS#7 padding.
    #[error("invalid block padding")]
    BadPadding,

    /// The buffer is too short or does not start with the expected marker.
    #[error("invalid encrypted field format")]
    InvalidFormat,
}

/// Build the AES-256-GCM cipher for `key`.
pub fn build_cipher(key: &EncryptionKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext` and frame it as `[0x01][nonce][ciphertext+tag]`.
///
/// # Errors
///
/// Returns [`CipherError::Entropy`] if no nonce could be drawn and
/// [`CipherError::AeadFailure`] on an internal AEAD error (unreachable with a
/// valid key and nonce).
pub fn seal(cipher: &Aes256Gcm, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| CipherError::Entropy(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| CipherError::AeadFailure)?;

    let mut out = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
    out.push(VERSION_AES_GCM);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open a framed version-1 buffer produced by [`seal`].
///
/// # Errors
///
/// Returns [`CipherError::InvalidFormat`] if the marker is missing or the
/// buffer cannot hold a nonce and tag, and [`CipherError::AeadFailure`] if
/// authentication fails (wrong key or tampered data).
pub fn open(cipher: &Aes256Gcm, framed: &[u8]) -> Result<Vec<u8>, CipherError> {
    let body = match framed.split_first() {
        Some((&VERSION_AES_GCM, body)) if body.len() >= NONCE_LEN + TAG_LEN => body,
        _ => return Err(CipherError::InvalidFormat),
    };
    let (nonce, ciphertext) = body.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::AeadFailure)
}
