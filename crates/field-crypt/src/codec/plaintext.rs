//! The "already plaintext" heuristic used by the legacy fallback chain.

/// Returns `true` if `bytes` look like unencrypted text.
///
/// The policy is deliberately narrow: the input must be non-empty and every
/// byte must be visible ASCII (`0x20..=0x7E`) or ASCII whitespace
/// (`\t`, `\n`, `\x0B`, `\x0C`, `\r`). Any multi-byte UTF-8 sequence fails.
pub fn is_probably_plaintext(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|&b| matches!(b, 0x20..=0x7E | b'\t' | b'\n' | 0x0B | 0x0C | b'\r'))
}
