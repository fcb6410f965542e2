//! Peppered bcrypt password hashing.
//!
//! A server-side secret (the pepper) is prepended to every plaintext before
//! bcrypt sees it. bcrypt adds its own random per-hash salt, so hashing the
//! same password twice gives two different strings that both verify.

use std::fmt;
use std::sync::Arc;

/// bcrypt only reads the first 72 bytes of its input.
pub const BCRYPT_MAX_INPUT_BYTES: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Pepper plus password would be cut off by bcrypt.
    #[error("password is too long: at most {max} bytes allowed, got {len}")]
    TooLong { len: usize, max: usize },

    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
}

#[derive(Clone)]
pub struct CredentialHasher {
    pepper: Arc<str>,
    cost: u32,
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("pepper", &"<redacted>")
            .field("cost", &self.cost)
            .finish()
    }
}

impl CredentialHasher {
    pub fn new(pepper: impl Into<Arc<str>>, cost: u32) -> Self {
        Self {
            pepper: pepper.into(),
            cost,
        }
    }

    /// Longest password, in bytes, that fits next to the pepper.
    pub fn max_password_bytes(&self) -> usize {
        BCRYPT_MAX_INPUT_BYTES.saturating_sub(self.pepper.len())
    }

    fn peppered(&self, password: &str) -> String {
        let mut input = String::with_capacity(self.pepper.len() + password.len());
        input.push_str(&self.pepper);
        input.push_str(password);
        input
    }

    /// Hash a plaintext password. Returns the modular-crypt string (`$2b$...`).
    ///
    /// Passwords that would push the peppered input past 72 bytes are refused,
    /// since bcrypt would silently ignore the tail.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        let max = self.max_password_bytes();
        if password.len() > max {
            return Err(HashError::TooLong {
                len: password.len(),
                max,
            });
        }
        Ok(bcrypt::hash(self.peppered(password), self.cost)?)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed stored hash fails closed: it is logged and reported as a
    /// mismatch rather than surfaced to the caller.
    ///
    /// A password too long to have been hashed never matches.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        if password.len() > self.max_password_bytes() {
            return false;
        }
        match bcrypt::verify(self.peppered(password), stored_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const TEST_COST: u32 = 4;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new("pepper-for-tests", TEST_COST)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("correct-horse").expect("hashing should succeed");

        assert!(hash.starts_with("$2"), "expected bcrypt modular-crypt prefix");
        assert!(hasher.verify("correct-horse", &hash));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hasher = hasher();
        let hash = hasher.hash("real-password").unwrap();
        assert!(!hasher.verify("wrong-password", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b, "each hash carries its own salt");
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn test_pepper_is_part_of_the_hash() {
        let hash = hasher().hash("secret").unwrap();
        let other = CredentialHasher::new("different-pepper", TEST_COST);
        assert!(!other.verify("secret", &hash));

        // The pepper is not a salt: hashing the bare password does not verify.
        let unpeppered = bcrypt::hash("secret", TEST_COST).unwrap();
        assert!(!hasher().verify("secret", &unpeppered));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!hasher().verify("anything", "not-a-bcrypt-hash"));
        assert!(!hasher().verify("anything", ""));
    }

    #[test]
    fn test_multibyte_tail_is_not_truncated() {
        let hasher = CredentialHasher::new("A".repeat(32), TEST_COST);
        // 30 characters each, 59 bytes: past the 40 bytes left after the pepper.
        let a = format!("{}a", "\u{e9}".repeat(29));
        let b = format!("{}b", "\u{e9}".repeat(29));

        assert_matches!(
            hasher.hash(&a),
            Err(HashError::TooLong { len: 59, max: 40 })
        );

        let fits = "\u{e9}".repeat(20);
        let hash = hasher.hash(&fits).unwrap();
        assert!(hasher.verify(&fits, &hash));
        assert!(!hasher.verify(&format!("{fits}x"), &hash));
        assert!(!hasher.verify(&b, &hash));
    }

    #[test]
    fn test_password_filling_the_budget_is_accepted() {
        let hasher = CredentialHasher::new("p".repeat(40), TEST_COST);
        assert_eq!(hasher.max_password_bytes(), 32);
        let hash = hasher.hash(&"x".repeat(32)).unwrap();
        assert!(hasher.verify(&"x".repeat(32), &hash));
        assert_matches!(hasher.hash(&"x".repeat(33)), Err(HashError::TooLong { .. }));
    }

    #[test]
    fn test_debug_redacts_pepper() {
        let rendered = format!("{:?}", hasher());
        assert!(!rendered.contains("pepper-for-tests"));
    }
}
