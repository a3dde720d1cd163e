//! Ordered decode chain over every stored format ever written.
//!
//! Each [`Step`] pairs the [`Format`] it recognises with an attempt function.
//! Steps run in table order and the first attempt that yields a string wins,
//! so adding or retiring a legacy format is an edit to [`DECODE_CHAIN`] only.
//! Order runs from the least ambiguous format to the most permissive one.

use std::fmt;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use tracing::{debug, warn};

use super::plaintext::is_probably_plaintext;
use super::FieldCodec;
use crate::crypto::{cipher, legacy, legacy_cbc, CipherError, NONCE_LEN, TAG_LEN, VERSION_AES_GCM};

/// Shortest buffer a version-1 writer (GCM or CBC) ever produced.
const MIN_VERSIONED_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

/// Standard alphabet; accepts input with or without `=` padding.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Stored shape a field value was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Not base64 at all (or empty): written before encryption existed.
    Unencoded,
    /// Current format: version byte `0x01`, AES-256-GCM.
    AesGcmV1,
    /// Version byte `0x01` followed by a 16-byte IV and AES-256-CBC blocks.
    AesCbcV1,
    /// Pre-versioned XSalsa20-Poly1305 secretbox.
    LegacySecretbox,
    /// Carries the version marker but no reader opened it under this key.
    /// Returned as stored; the value is ciphertext, not plain text.
    Undecryptable,
    /// Valid base64 that is nevertheless plain text as stored.
    RawPlaintext,
    /// Base64 armoring around plain text.
    Base64Plaintext,
    /// Nothing matched; the stored value is returned unchanged.
    Opaque,
}

impl Format {
    /// Returns `true` for the format the encoder currently writes.
    pub fn is_current(&self) -> bool {
        matches!(self, Format::AesGcmV1)
    }

    /// Short label used in log events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Unencoded => "unencoded",
            Format::AesGcmV1 => "aes-gcm-v1",
            Format::AesCbcV1 => "aes-cbc-v1",
            Format::LegacySecretbox => "legacy-secretbox",
            Format::Undecryptable => "undecryptable",
            Format::RawPlaintext => "raw-plaintext",
            Format::Base64Plaintext => "base64-plaintext",
            Format::Opaque => "opaque",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of decoding one stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The logical plaintext.
    pub plaintext: String,
    /// The format the stored value matched.
    pub format: Format,
}

/// A stored value together with its base64 decoding, computed once.
pub(crate) struct Candidate<'a> {
    raw: &'a str,
    decoded: Option<Vec<u8>>,
}

impl<'a> Candidate<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            decoded: LENIENT_STANDARD.decode(raw).ok(),
        }
    }
}

pub(crate) type Attempt = fn(&FieldCodec, &Candidate<'_>) -> Option<String>;

/// One entry of the decode chain.
pub(crate) struct Step {
    pub format: Format,
    pub attempt: Attempt,
}

/// The decode chain, in priority order.
pub(crate) const DECODE_CHAIN: &[Step] = &[
    Step {
        format: Format::Unencoded,
        attempt: unencoded,
    },
    Step {
        format: Format::AesGcmV1,
        attempt: aes_gcm_v1,
    },
    Step {
        format: Format::AesCbcV1,
        attempt: aes_cbc_v1,
    },
    Step {
        format: Format::LegacySecretbox,
        attempt: legacy_secretbox,
    },
    Step {
        format: Format::Undecryptable,
        attempt: undecryptable,
    },
    Step {
        format: Format::RawPlaintext,
        attempt: raw_plaintext,
    },
    Step {
        format: Format::Base64Plaintext,
        attempt: base64_plaintext,
    },
];

/// Run `raw` through [`DECODE_CHAIN`], falling back to [`Format::Opaque`].
pub(crate) fn decode(codec: &FieldCodec, raw: &str) -> Decoded {
    decode_with(DECODE_CHAIN, codec, raw)
}

fn decode_with(chain: &[Step], codec: &FieldCodec, raw: &str) -> Decoded {
    let candidate = Candidate::new(raw);
    for step in chain {
        if let Some(plaintext) = (step.attempt)(codec, &candidate) {
            if !matches!(
                step.format,
                Format::AesGcmV1 | Format::Unencoded | Format::Undecryptable
            ) {
                debug!(format = %step.format, "field decoded via legacy fallback");
            }
            return Decoded {
                plaintext,
                format: step.format,
            };
        }
    }

    warn!(
        len = raw.len(),
        "field matched no known format; returning stored value unchanged"
    );
    Decoded {
        plaintext: raw.to_owned(),
        format: Format::Opaque,
    }
}

fn unencoded(_: &FieldCodec, c: &Candidate<'_>) -> Option<String> {
    match &c.decoded {
        None => Some(c.raw.to_owned()),
        Some(_) if c.raw.is_empty() => Some(String::new()),
        Some(_) => None,
    }
}

fn aes_gcm_v1(codec: &FieldCodec, c: &Candidate<'_>) -> Option<String> {
    let bytes = c.decoded.as_deref()?;
    if bytes.first() != Some(&VERSION_AES_GCM) {
        return None;
    }
    match cipher::open(&codec.current, bytes) {
        Ok(plaintext) => match String::from_utf8(plaintext) {
            Ok(s) => Some(s),
            Err(_) => {
                warn!("version-1 field decrypted to invalid UTF-8; trying legacy formats");
                None
            }
        },
        Err(CipherError::InvalidFormat) => {
            warn!(len = bytes.len(), "version-1 field is truncated; trying legacy formats");
            None
        }
        Err(e) => {
            warn!(error = %e, "version-1 field failed authentication; trying legacy formats");
            None
        }
    }
}

fn aes_cbc_v1(codec: &FieldCodec, c: &Candidate<'_>) -> Option<String> {
    let bytes = c.decoded.as_deref()?;
    let plaintext = legacy_cbc::open(&codec.cbc, bytes).ok()?;
    String::from_utf8(plaintext).ok()
}

fn legacy_secretbox(codec: &FieldCodec, c: &Candidate<'_>) -> Option<String> {
    let bytes = c.decoded.as_deref()?;
    let plaintext = legacy::open(&codec.legacy, bytes).ok()?;
    String::from_utf8(plaintext).ok()
}

fn undecryptable(_: &FieldCodec, c: &Candidate<'_>) -> Option<String> {
    let bytes = c.decoded.as_deref()?;
    if bytes.first() != Some(&VERSION_AES_GCM) || bytes.len() < MIN_VERSIONED_LEN {
        return None;
    }
    warn!(
        len = bytes.len(),
        "version-1 field could not be opened with this key; returning stored value unchanged"
    );
    Some(c.raw.to_owned())
}

fn raw_plaintext(_: &FieldCodec, c: &Candidate<'_>) -> Option<String> {
    is_probably_plaintext(c.raw.as_bytes()).then(|| c.raw.to_owned())
}

fn base64_plaintext(_: &FieldCodec, c: &Candidate<'_>) -> Option<String> {
    let bytes = c.decoded.as_deref()?;
    if !is_probably_plaintext(bytes) {
        return None;
    }
    String::from_utf8(bytes.to_vec()).ok()
}
