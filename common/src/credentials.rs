//! Password hashing and bearer-token primitives.
//!
//! Stored passwords are `hex(HMAC-SHA256(key = salt, message = password))`.
//! The salt is generated once per developer and never changes, so a login can
//! always recompute the stored value from the presented password.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

fn keyed_mac(salt: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts keys of any length")
}

/// Hashes `password` with `salt` into its stored, hex-encoded form.
///
/// Deterministic for identical inputs. Empty strings are accepted; callers
/// reject empty passwords before getting here.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut mac = keyed_mac(salt);
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `password` against a stored hash in constant time.
///
/// A stored value that is not valid hex never verifies.
pub fn verify_password(password: &str, salt: &str, stored: &str) -> bool {
    let Ok(expected) = hex::decode(stored) else {
        return false;
    };
    let mut mac = keyed_mac(salt);
    mac.update(password.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Generates a fresh per-developer salt.
pub fn generate_salt() -> String {
    Uuid::new_v4().to_string()
}

/// Issues a fresh opaque bearer token.
pub fn issue_token() -> String {
    Uuid::new_v4().to_string()
}

/// Compares a presented token with the stored one in constant time.
///
/// An empty presented token never matches.
pub fn tokens_match(presented: &str, stored: &str) -> bool {
    !presented.is_empty() && bool::from(presented.as_bytes().ct_eq(stored.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn matches_reference_vector() {
        assert_eq!(
            hash_password("world", "hello"),
            "f1ac9702eb5faf23ca291a4dc46deddeee2a78ccdaf0a412bed7714cfffb1cc4"
        );
    }

    #[test]
    fn empty_inputs_still_hash() {
        let hash = hash_password("", "");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_password("", ""));
    }

    #[test]
    fn verify_accepts_only_the_hashed_password() {
        let salt = generate_salt();
        let stored = hash_password("java$cript", &salt);

        assert!(verify_password("java$cript", &salt, &stored));
        assert!(!verify_password("wrong", &salt, &stored));
        assert!(!verify_password("java$cript", &generate_salt(), &stored));
    }

    #[test]
    fn verify_rejects_malformed_stored_hash() {
        assert!(!verify_password("world", "hello", "not-hex"));
        assert!(!verify_password("world", "hello", ""));
        assert!(!verify_password("world", "hello", "f1ac9702"));
    }

    #[test]
    fn salts_do_not_collide() {
        let salts: HashSet<String> = (0..10_000).map(|_| generate_salt()).collect();
        assert_eq!(salts.len(), 10_000);
    }

    #[test]
    fn tokens_do_not_collide() {
        let tokens: HashSet<String> = (0..10_000).map(|_| issue_token()).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn tokens_match_only_identical_tokens() {
        let token = issue_token();

        assert!(tokens_match(&token, &token.clone()));
        assert!(!tokens_match(&issue_token(), &token));
        assert!(!tokens_match(&token[..8], &token));
        assert!(!tokens_match("", ""));
    }

    mod proptest_hashing {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hashing_is_deterministic(password in ".*", salt in ".*") {
                prop_assert_eq!(hash_password(&password, &salt), hash_password(&password, &salt));
            }

            #[test]
            fn distinct_passwords_hash_differently(
                a in "[ -~]{0,24}",
                b in "[ -~]{0,24}",
                salt in "[a-f0-9-]{36}",
            ) {
                prop_assume!(a != b);
                prop_assert_ne!(hash_password(&a, &salt), hash_password(&b, &salt));
            }

            #[test]
            fn hash_verifies_against_itself(password in "[ -~]{0,32}", salt in "[ -~]{0,32}") {
                let stored = hash_password(&password, &salt);
                prop_assert!(verify_password(&password, &salt, &stored));
            }
        }
    }
}
