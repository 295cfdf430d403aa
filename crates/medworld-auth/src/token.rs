//! Opaque session token codec.
//!
//! A plaintext token is `"{id}|{secret}"` where `id` is the database row id
//! of the token record and `secret` is a 40-character alphanumeric string.
//! Only the SHA-256 hex digest of the secret is stored; resolving a request
//! token means splitting it, loading row `id`, and comparing digests.

use rand::RngExt as _;
use rand::distr::Alphanumeric;
use sha2::{Digest as _, Sha256};

/// Length of the random secret part of a plaintext token.
pub const SECRET_LEN: usize = 40;

/// Generate a fresh random token secret.
pub fn new_secret() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect()
}

/// SHA-256 hex digest of a token secret, as stored in `access_tokens.token`.
pub fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

/// Compose the plaintext token handed to the client.
pub fn format_token(id: i64, secret: &str) -> String {
    format!("{id}|{secret}")
}

/// Split a plaintext token into `(id, secret)`.
///
/// Returns `None` when the value has no `|` separator or the id part is not
/// a number; such tokens can never resolve and are rejected as
/// unauthenticated without touching the database.
pub fn split_token(value: &str) -> Option<(i64, &str)> {
    let (id, secret) = value.split_once('|')?;
    let id = id.parse::<i64>().ok()?;
    Some((id, secret))
}

/// Compare a presented secret against a stored digest without short-circuit
/// on the first differing byte. Both sides are fixed-length hex so the
/// comparison shape does not depend on where they differ.
pub fn digest_matches(secret: &str, stored_digest: &str) -> bool {
    let candidate = hash_secret(secret);
    if candidate.len() != stored_digest.len() {
        return false;
    }
    candidate
        .bytes()
        .zip(stored_digest.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_trip_format_and_split() {
        let token = format_token(42, "s3cret");
        assert_eq!(token, "42|s3cret");
        assert_eq!(split_token(&token), Some((42, "s3cret")));
    }

    #[test]
    fn should_split_on_first_separator_only() {
        assert_eq!(split_token("7|ab|cd"), Some((7, "ab|cd")));
    }

    #[test]
    fn should_reject_tokens_without_separator_or_numeric_id() {
        assert_eq!(split_token("no-separator"), None);
        assert_eq!(split_token("abc|secret"), None);
        assert_eq!(split_token("|secret"), None);
    }

    #[test]
    fn should_generate_alphanumeric_secrets_of_fixed_length() {
        let secret = new_secret();
        assert_eq!(secret.len(), SECRET_LEN);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn should_generate_distinct_secrets() {
        assert_ne!(new_secret(), new_secret());
    }

    #[test]
    fn should_hash_secrets_to_lowercase_sha256_hex() {
        // Known SHA-256 vector.
        assert_eq!(
            hash_secret("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let digest = hash_secret(&new_secret());
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn should_hash_deterministically() {
        let secret = new_secret();
        assert_eq!(hash_secret(&secret), hash_secret(&secret));
    }

    #[test]
    fn should_match_digest_only_for_the_original_secret() {
        let secret = new_secret();
        let stored = hash_secret(&secret);
        assert!(digest_matches(&secret, &stored));
        assert!(!digest_matches("wrong-secret", &stored));
        assert!(!digest_matches(&secret, "not-a-digest"));
    }
}
