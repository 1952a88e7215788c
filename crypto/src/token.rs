//! Random identifiers and voter tokens from the OS entropy source.

use crate::error::CryptoError;

/// Default entropy for identifiers and voter tokens (128 bits).
pub const DEFAULT_TOKEN_BYTES: usize = 16;

/// Minimum accepted entropy for voter tokens, which act as bearer credentials.
pub const MIN_TOKEN_BYTES: usize = 12;

/// Generate `bytes` random bytes, hex encoded.
pub fn random_hex(bytes: usize) -> Result<String, CryptoError> {
    let mut buf = vec![0u8; bytes];
    getrandom::getrandom(&mut buf).map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(hex::encode(buf))
}

/// Generate a prefixed identifier, e.g. `poll_3f9a...`.
pub fn random_id(prefix: &str) -> Result<String, CryptoError> {
    Ok(format!("{}_{}", prefix, random_hex(DEFAULT_TOKEN_BYTES)?))
}

/// Generate a voter token with at least [`MIN_TOKEN_BYTES`] of entropy.
pub fn voter_token(bytes: usize) -> Result<String, CryptoError> {
    random_hex(bytes.max(MIN_TOKEN_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_length_matches_entropy() {
        assert_eq!(random_hex(16).unwrap().len(), 32);
    }

    #[test]
    fn ids_are_prefixed_and_distinct() {
        let a = random_id("poll").unwrap();
        let b = random_id("poll").unwrap();
        assert!(a.starts_with("poll_"));
        assert_ne!(a, b);
    }

    #[test]
    fn voter_tokens_have_a_floor() {
        assert_eq!(voter_token(4).unwrap().len(), MIN_TOKEN_BYTES * 2);
    }
}
