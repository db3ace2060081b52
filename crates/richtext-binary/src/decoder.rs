//! Binary digit decoding.
//!
//! Digits are read left to right in groups of 8, after whitespace is removed. Each full
//! group is an unsigned byte that maps to the character with that code point
//! (`U+0000..=U+00FF`). A trailing group of fewer than 8 digits is dropped, not padded.

use crate::error::{DecodeError, Recovery};
use tracing::trace;

/// Number of digits in one decoded character.
pub const BITS_PER_BYTE: usize = 8;

/// Result of [`decode_detailed`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    /// Decoded characters, one per full byte.
    pub text: String,
    /// Raw byte values.
    pub bytes: Vec<u8>,
    /// Digits left over after the last full byte (`0..8`).
    pub dropped_digits: usize,
}

impl Decoded {
    /// Returns `true` if trailing digits were left undecoded.
    pub fn is_underrun(&self) -> bool {
        self.dropped_digits > 0
    }
}

/// Decode a binary digit string into its byte-string representation.
///
/// ```rust
/// use richtext_binary::decode;
///
/// assert_eq!(decode("01001000 01100101 01101100 01101100 01101111").unwrap(), "Hello");
/// assert_eq!(decode("010010000110").unwrap(), "H");
/// assert_eq!(decode("   ").unwrap(), "");
/// ```
pub fn decode(input: &str) -> Result<String, DecodeError> {
    decode_detailed(input).map(|decoded| decoded.text)
}

/// Like [`decode`], also reporting raw bytes and the number of dropped trailing digits.
pub fn decode_detailed(input: &str) -> Result<Decoded, DecodeError> {
    let mut bytes = Vec::with_capacity(input.len() / BITS_PER_BYTE);
    let mut current: u8 = 0;
    let mut filled = 0;

    for (index, ch) in input.chars().enumerate() {
        let bit = match ch {
            '0' => 0,
            '1' => 1,
            ch if ch.is_whitespace() => continue,
            ch => return Err(DecodeError::InvalidDigit { ch, index }),
        };
        current = (current << 1) | bit;
        filled += 1;
        if filled == BITS_PER_BYTE {
            bytes.push(current);
            current = 0;
            filled = 0;
        }
    }

    if filled > 0 {
        trace!(
            recovery = %Recovery::DecodeUnderrun,
            dropped_digits = filled,
            "trailing digits not decoded"
        );
    }

    Ok(Decoded {
        text: bytes.iter().copied().map(char::from).collect(),
        bytes,
        dropped_digits: filled,
    })
}

/// `input` without any whitespace.
pub fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|ch| !ch.is_whitespace()).collect()
}

/// Number of `0`/`1` characters in `input`.
pub fn digit_count(input: &str) -> usize {
    input.chars().filter(|ch| matches!(ch, '0' | '1')).count()
}
