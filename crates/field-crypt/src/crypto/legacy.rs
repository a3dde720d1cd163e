//! Reader for the pre-versioned secretbox format.
//!
//! Rows written before the version byte existed hold
//! `[nonce: 24 bytes][XSalsa20-Poly1305 ciphertext || tag]` under the same
//! 32-byte key. The codec only ever opens this format; it never writes it.

use crypto_secretbox::{
    aead::{Aead, KeyInit},
    Key, Nonce, XSalsa20Poly1305,
};

use super::cipher::{CipherError, TAG_LEN};
use crate::key::EncryptionKey;

/// Byte length of a secretbox nonce (24 bytes = 192 bits).
pub const LEGACY_NONCE_LEN: usize = 24;

/// Build the XSalsa20-Poly1305 cipher for `key`.
pub fn build_cipher(key: &EncryptionKey) -> XSalsa20Poly1305 {
    XSalsa20Poly1305::new(Key::from_slice(key.as_bytes()))
}

/// Open a `[nonce][ciphertext+tag]` secretbox buffer.
///
/// # Errors
///
/// Returns [`CipherError::InvalidFormat`] if the buffer cannot hold a nonce and
/// tag, and [`CipherError::AeadFailure`] if authentication fails.
pub fn open(cipher: &XSalsa20Poly1305, data: &[u8]) -> Result<Vec<u8>, CipherError> {
    if data.len() < LEGACY_NONCE_LEN + TAG_LEN {
        return Err(CipherError::InvalidFormat);
    }
    let (nonce, ciphertext) = data.split_at(LEGACY_NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::AeadFailure)
}

/// Produce a legacy buffer with a caller-chosen nonce, for building fixtures.
#[cfg(test)]
pub(crate) fn seal(
    cipher: &XSalsa20Poly1305,
    nonce: [u8; LEGACY_NONCE_LEN],
    plaintext: &[u8],
) -> Vec<u8> {
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .expect("secretbox encryption");
    [nonce.as_slice(), &ciphertext].concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;

    fn test_cipher(fill: u8) -> XSalsa20Poly1305 {
        build_cipher(&EncryptionKey::from_bytes(&[fill; KEY_LEN]).unwrap())
    }

    #[test]
    fn opens_legacy_buffer() {
        let cipher = test_cipher(0x42);
        let data = seal(&cipher, [9u8; LEGACY_NONCE_LEN], b"Example Domain");
        assert_eq!(data.len(), LEGACY_NONCE_LEN + 14 + TAG_LEN);
        assert_eq!(open(&cipher, &data).unwrap(), b"Example Domain");
    }

    #[test]
    fn wrong_key_fails() {
        let data = seal(&test_cipher(0x01), [9u8; LEGACY_NONCE_LEN], b"secret");
        assert!(matches!(
            open(&test_cipher(0x02), &data),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn short_buffer_is_invalid_format() {
        let cipher = test_cipher(0x42);
        assert!(matches!(
            open(&cipher, &[0u8; LEGACY_NONCE_LEN + TAG_LEN - 1]),
            Err(CipherError::InvalidFormat)
        ));
    }
}
