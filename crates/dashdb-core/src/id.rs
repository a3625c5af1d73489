//! Primary key generation.
//!
//! Keys are drawn independently and uniformly from a fixed alphabet of digits
//! and lowercase letters using the operating system's CSPRNG. No uniqueness
//! check is made against existing keys; a 32-symbol key carries ~165 bits of
//! entropy.

use crate::error::{DashError, Result};

/// The 36 symbols a generated key may contain.
pub const ALPHABET: &[u8; 36] = b"1234567890qwertyuiopasdfghjklzxcvbnm";

/// Key length used when a collection does not configure one.
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Longest key a collection may be configured to generate.
pub const MAX_KEY_LENGTH: usize = 1024;

// Largest multiple of 36 that fits in a byte; bytes at or above it are
// rejected so every symbol keeps probability 1/36.
const ACCEPT_BELOW: u8 = 252;

/// Generate a key of `length` symbols from [`ALPHABET`].
///
/// # Errors
///
/// Returns `DashError::State` if the entropy source is unavailable.
pub fn generate(length: usize) -> Result<String> {
    let mut key = String::with_capacity(length);
    let mut buf = [0u8; 64];

    while key.len() < length {
        getrandom::getrandom(&mut buf)
            .map_err(|e| DashError::State(format!("Entropy source unavailable: {}", e)))?;
        for &byte in buf.iter().filter(|&&byte| byte < ACCEPT_BELOW) {
            if key.len() == length {
                break;
            }
            key.push(ALPHABET[usize::from(byte % 36)] as char);
        }
    }

    Ok(key)
}

/// Whether `key` could have been produced by [`generate`].
pub fn is_valid(key: &str) -> bool {
    key.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_length() {
        let key = generate(DEFAULT_KEY_LENGTH).unwrap();
        assert_eq!(key.len(), 32);
        assert!(is_valid(&key));
    }

    #[test]
    fn test_custom_lengths() {
        for length in [1, 8, 63, 64, 65, 200] {
            let key = generate(length).unwrap();
            assert_eq!(key.len(), length);
            assert!(is_valid(&key));
        }
    }

    #[test]
    fn test_zero_length_is_empty() {
        assert_eq!(generate(0).unwrap(), "");
    }

    #[test]
    fn test_alphabet_has_no_duplicates() {
        let unique: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(unique.len(), ALPHABET.len());
        assert_eq!(usize::from(ACCEPT_BELOW), ALPHABET.len() * 7);
    }

    #[test]
    fn test_keys_differ() {
        let keys: HashSet<String> = (0..1000).map(|_| generate(16).unwrap()).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_is_valid_rejects_foreign_symbols() {
        assert!(!is_valid("ABC"));
        assert!(!is_valid("abc-123"));
        assert!(is_valid("abc123"));
    }
}
