// Short tokens: compact base62 identifiers for share links
//
// Each random byte picks an alphabet symbol via `byte % 62`. Since 256 is not
// a multiple of 62, the first 8 symbols ('0'..='7') come up slightly more often
// (5/256 vs 4/256). That skew is accepted as-is.
//
// No collision check happens here; the backend owns uniqueness.

use rand::RngCore;

pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const DEFAULT_TOKEN_LENGTH: usize = 10;

/// Shortest token accepted by `is_valid_short_token`.
pub const MIN_TOKEN_LENGTH: usize = 6;

/// Longest token accepted by `is_valid_short_token`.
pub const MAX_TOKEN_LENGTH: usize = 20;

/// Generate a token from the OS random source.
///
/// Panics if the OS random source is unavailable.
pub fn generate_short_token(length: usize) -> String {
    generate_short_token_with(&mut rand::rngs::OsRng, length)
}

/// Generate a token from a caller-supplied RNG.
pub fn generate_short_token_with<R: RngCore + ?Sized>(rng: &mut R, length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}

/// True iff the token is 6–20 ASCII alphanumerics.
pub fn is_valid_short_token(token: &str) -> bool {
    (MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&token.len())
        && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use std::collections::HashSet;

    #[test]
    fn test_default_length() {
        let token = generate_short_token(DEFAULT_TOKEN_LENGTH);
        assert_eq!(token.len(), 10);
        assert!(token.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_zero_length() {
        assert_eq!(generate_short_token(0), "");
    }

    #[test]
    fn test_byte_mapping_is_modulo() {
        // StepRng with zero increment repeats one word; fill_bytes writes it little-endian.
        let mut rng = StepRng::new(u64::from_le_bytes([0, 61, 62, 63, 255, 10, 36, 124]), 0);
        let token = generate_short_token_with(&mut rng, 8);
        assert_eq!(token, "0Z017aA0");
    }

    #[test]
    fn test_no_duplicates_in_practice() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_short_token(10)));
        }
    }

    #[test]
    fn test_validity_bounds() {
        assert!(!is_valid_short_token("abc12"));
        assert!(is_valid_short_token("abc123"));
        assert!(is_valid_short_token(&"a".repeat(20)));
        assert!(!is_valid_short_token(&"a".repeat(21)));
    }

    #[test]
    fn test_validity_alphabet() {
        assert!(!is_valid_short_token("abc-123"));
        assert!(!is_valid_short_token("abc_1234"));
        assert!(!is_valid_short_token("abcé1234"));
        assert!(is_valid_short_token("Ab3xY9Qz"));
    }
}
