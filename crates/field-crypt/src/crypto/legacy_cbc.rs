//! Reader for the unauthenticated AES-256-CBC generation.
//!
//! One service generation wrote `[0x01][iv: 16 bytes][AES-256-CBC ciphertext]`
//! with PKCS#7 padding under the same key, reusing the version marker the
//! current format now owns. The only integrity signal is the padding, so a
//! successful open here is weaker evidence than a GCM tag; the chain tries it
//! strictly after version 1.

use aes::{
    cipher::{block_padding::Pkcs7, BlockDecryptMut, InnerIvInit, Key, KeyInit},
    Aes256,
};

use super::cipher::{CipherError, VERSION_AES_GCM};
use crate::key::EncryptionKey;

/// Byte length of a CBC initialisation vector (one AES block).
pub const CBC_IV_LEN: usize = 16;

/// AES block size; the ciphertext is always a whole number of blocks.
pub const CBC_BLOCK_LEN: usize = 16;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Build the raw AES-256 block cipher for `key`.
pub fn build_cipher(key: &EncryptionKey) -> Aes256 {
    Aes256::new(Key::<Aes256>::from_slice(key.as_bytes()))
}

/// Returns `true` if `framed` has the shape of a CBC buffer: marker, IV and at
/// least one whole ciphertext block.
pub fn is_cbc_shaped(framed: &[u8]) -> bool {
    match framed.split_first() {
        Some((&VERSION_AES_GCM, body)) => {
            body.len() >= CBC_IV_LEN + CBC_BLOCK_LEN && body.len() % CBC_BLOCK_LEN == 0
        }
        _ => false,
    }
}

/// Open a `[0x01][iv][ciphertext]` buffer and strip its PKCS#7 padding.
///
/// # Errors
///
/// Returns [`CipherError::InvalidFormat`] if the buffer is not CBC-shaped and
/// [`CipherError::BadPadding`] if the decrypted padding is invalid (wrong key
/// or a buffer from another format).
pub fn open(cipher: &Aes256, framed: &[u8]) -> Result<Vec<u8>, CipherError> {
    if !is_cbc_shaped(framed) {
        return Err(CipherError::InvalidFormat);
    }
    let (iv, ciphertext) = framed[1..].split_at(CBC_IV_LEN);
    Aes256CbcDec::inner_iv_slice_init(cipher.clone(), iv)
        .map_err(|_| CipherError::InvalidFormat)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::BadPadding)
}

/// Produce a CBC buffer with a caller-chosen IV, for building fixtures.
#[cfg(test)]
pub(crate) fn seal(cipher: &Aes256, iv: [u8; CBC_IV_LEN], plaintext: &[u8]) -> Vec<u8> {
    use aes::cipher::BlockEncryptMut;

    let ciphertext = cbc::Encryptor::<Aes256>::inner_iv_slice_init(cipher.clone(), &iv)
        .expect("16-byte iv")
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    [&[VERSION_AES_GCM][..], &iv[..], &ciphertext[..]].concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    /// `openssl enc -aes-256-cbc -K 4242..42 -iv 000102..0f` over
    /// "Example Domain", framed with the version marker.
    const OPENSSL_FIXTURE: &str = "AQABAgMEBQYHCAkKCwwNDg9lIAcLhGGUcZaTnhN28xqd";

    fn test_cipher(fill: u8) -> Aes256 {
        build_cipher(&EncryptionKey::from_bytes(&[fill; KEY_LEN]).unwrap())
    }

    #[test]
    fn opens_openssl_fixture() {
        let framed = STANDARD.decode(OPENSSL_FIXTURE).unwrap();
        assert!(is_cbc_shaped(&framed));
        assert_eq!(open(&test_cipher(0x42), &framed).unwrap(), b"Example Domain");
    }

    #[test]
    fn seal_matches_openssl_layout() {
        let iv: [u8; CBC_IV_LEN] = core::array::from_fn(|i| i as u8);
        let framed = seal(&test_cipher(0x42), iv, b"Example Domain");
        assert_eq!(STANDARD.encode(framed), OPENSSL_FIXTURE);
    }

    #[test]
    fn wrong_key_is_rejected_or_garbled() {
        // Without a MAC a wrong key is only caught by the padding check, which
        // a random last block passes about once in 256 tries.
        let framed = STANDARD.decode(OPENSSL_FIXTURE).unwrap();
        match open(&test_cipher(0x43), &framed) {
            Err(CipherError::BadPadding) => {}
            Ok(garbled) => assert_ne!(garbled, b"Example Domain"),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn shape_check() {
        assert!(!is_cbc_shaped(&[]));
        assert!(!is_cbc_shaped(&[VERSION_AES_GCM; 1 + CBC_IV_LEN]));
        assert!(!is_cbc_shaped(&[VERSION_AES_GCM; 1 + CBC_IV_LEN + 15]));
        assert!(is_cbc_shaped(&[VERSION_AES_GCM; 1 + CBC_IV_LEN + 32]));
        assert!(!is_cbc_shaped(&[0x02; 1 + CBC_IV_LEN + 16]));
        assert!(matches!(
            open(&test_cipher(0x42), &[VERSION_AES_GCM; 20]),
            Err(CipherError::InvalidFormat)
        ));
    }
}
