//! AEAD primitives behind the stored field formats.
//!
//! This module knows nothing about base64 or the fallback chain; it frames and
//! opens raw byte buffers.
//!
//! # Current format (version 1)
//!
//! ```text
//! [ 0x01 ][ nonce: 12 bytes ][ AES-256-GCM ciphertext || tag: 16 bytes ]
//! ```
//!
//! # Legacy formats (read-only)
//!
//! ```text
//! [ 0x01 ][ iv: 16 bytes ][ AES-256-CBC ciphertext, PKCS#7 padded ]
//! [ nonce: 24 bytes ][ XSalsa20-Poly1305 ciphertext || tag: 16 bytes ]
//! ```

pub mod cipher;
pub mod legacy;
pub mod legacy_cbc;

pub use cipher::{CipherError, KEY_LEN, NONCE_LEN, TAG_LEN, VERSION_AES_GCM};
pub use legacy::LEGACY_NONCE_LEN;
pub use legacy_cbc::{CBC_BLOCK_LEN, CBC_IV_LEN};
