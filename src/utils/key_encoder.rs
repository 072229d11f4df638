//! Turns an allocated global key into the external short code.
//!
//! A code is the base58 form of the key followed by a two character suffix
//! cut from the SHA-256 hex digest of the target URL at a random offset. The
//! suffix adds per-call entropy so two URLs processed under neighbouring keys
//! are less likely to collide if a key is ever issued twice.

use rand::Rng;
use sha2::{Digest, Sha256};

use super::base58::{decode58, encode58};
use crate::error::AppError;

/// Number of characters appended after the base58 key.
pub const SUFFIX_LEN: usize = 2;

/// Encodes `key` and `payload` into a short code using the thread-local RNG.
///
/// Two calls with identical inputs may return different codes; the base58
/// prefix is always the same.
pub fn encode(key: u64, payload: &str) -> String {
    encode_with_rng(key, payload, &mut rand::rng())
}

/// Like [`encode`], with the suffix offset drawn from `rng`.
///
/// Passing a seeded RNG makes the code reproducible.
pub fn encode_with_rng<R: Rng>(key: u64, payload: &str, rng: &mut R) -> String {
    let digest = hex::encode(Sha256::digest(payload.as_bytes()));
    let offset = rng.random_range(0..digest.len() - SUFFIX_LEN);

    let mut code = encode58(key);
    code.push_str(&digest[offset..offset + SUFFIX_LEN]);
    code
}

/// Recovers the global key from a code produced by [`encode`].
///
/// Diagnostic only: lookups always use the full code as an opaque key.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the code is too short or its key part
/// is not valid base58.
pub fn decode_key(code: &str) -> Result<u64, AppError> {
    if !code.is_ascii() || code.len() <= SUFFIX_LEN {
        return Err(AppError::validation(format!(
            "'{code}' is not a generated short code"
        )));
    }

    decode58(&code[..code.len() - SUFFIX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const URL: &str = "http://www.google.com";

    #[test]
    fn test_code_starts_with_base58_key() {
        let code = encode(1, URL);
        assert_eq!(code.len(), 1 + SUFFIX_LEN);
        assert!(code.starts_with('2'));
    }

    #[test]
    fn test_suffix_is_taken_from_digest() {
        let digest = hex::encode(Sha256::digest(URL.as_bytes()));

        for _ in 0..100 {
            let code = encode(3364, URL);
            let suffix = &code[code.len() - SUFFIX_LEN..];
            assert!(digest.contains(suffix), "suffix {suffix} not in digest");
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_seeded_rng_reproduces_code() {
        let first = encode_with_rng(19_999_999, URL, &mut StdRng::seed_from_u64(7));
        let second = encode_with_rng(19_999_999, URL, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_key_strips_suffix() {
        for key in [0u64, 1, 57, 58, 3364, (1 << 31) - 1] {
            assert_eq!(decode_key(&encode(key, URL)).unwrap(), key);
        }
    }

    #[test]
    fn test_decode_key_rejects_short_input() {
        assert!(decode_key("ab").is_err());
        assert!(decode_key("").is_err());
    }

    #[test]
    fn test_distinct_keys_give_distinct_prefixes() {
        let a = encode(1000, URL);
        let b = encode(1001, URL);
        assert_ne!(&a[..a.len() - SUFFIX_LEN], &b[..b.len() - SUFFIX_LEN]);
    }
}
