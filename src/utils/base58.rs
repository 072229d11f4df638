//! Base58 positional encoding of non-negative integers.
//!
//! The alphabet omits `0`, `O`, `I` and `l` so codes survive being read
//! aloud or retyped.

use crate::error::AppError;

/// The 58 symbols in ascending digit order.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const BASE: u64 = 58;

/// Maps an ASCII byte to its digit value, `None` for bytes outside the alphabet.
fn digit_value(byte: u8) -> Option<u64> {
    ALPHABET
        .iter()
        .position(|&symbol| symbol == byte)
        .map(|position| position as u64)
}

/// Encodes `value` in base 58. Zero encodes as the first symbol (`"1"`).
pub fn encode58(mut value: u64) -> String {
    if value == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(ALPHABET[(value % BASE) as usize]);
        value /= BASE;
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base 58 string produced by [`encode58`].
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the input is empty, contains a symbol
/// outside the alphabet, or overflows `u64`.
pub fn decode58(encoded: &str) -> Result<u64, AppError> {
    if encoded.is_empty() {
        return Err(AppError::validation("base58 input is empty"));
    }

    encoded.bytes().try_fold(0u64, |acc, byte| {
        let digit = digit_value(byte).ok_or_else(|| {
            AppError::validation(format!(
                "'{}' is not a base58 symbol",
                char::from(byte).escape_default()
            ))
        })?;

        acc.checked_mul(BASE)
            .and_then(|shifted| shifted.checked_add(digit))
            .ok_or_else(|| AppError::validation(format!("'{encoded}' overflows a 64-bit key")))
    })
}
