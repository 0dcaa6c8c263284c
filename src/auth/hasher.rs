//! One-way hashing of credential secrets.
//!
//! Wraps bcrypt. Hashing and verification are deliberately slow, so both
//! run on the blocking pool and never stall the async workers.

use crate::error::{GateError, GateResult};

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// bcrypt-backed secret hasher.
///
/// Verification compares hashes in constant time with respect to the
/// secret's content (bcrypt's own comparison).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretHasher {
    cost: u32,
}

impl SecretHasher {
    /// Create a hasher with an explicit bcrypt cost.
    ///
    /// # Errors
    /// `ValidationInput` if `cost` is outside `4..=31`.
    pub fn new(cost: u32) -> GateResult<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(GateError::ValidationInput(format!(
                "hash cost {} outside {}..={}",
                cost, MIN_COST, MAX_COST
            )));
        }
        Ok(Self { cost })
    }

    /// The configured bcrypt cost.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `secret` on the current thread.
    pub fn hash_blocking(&self, secret: &str) -> GateResult<String> {
        bcrypt::hash(secret, self.cost)
            .map_err(|e| GateError::Storage(format!("secret hashing failed: {}", e)))
    }

    /// Check `secret` against `hash` on the current thread.
    ///
    /// Fails closed: a malformed hash or an empty secret never verifies.
    pub fn verify_blocking(secret: &str, hash: &str) -> bool {
        if secret.is_empty() {
            return false;
        }
        bcrypt::verify(secret, hash).unwrap_or(false)
    }

    /// Hash `secret` on the blocking pool.
    pub async fn hash(&self, secret: &str) -> GateResult<String> {
        let hasher = *self;
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&secret))
            .await
            .map_err(|e| GateError::Storage(format!("hashing task failed: {}", e)))?
    }

    /// Check `secret` against `hash` on the blocking pool.
    pub async fn verify(&self, secret: &str, hash: &str) -> bool {
        let secret = secret.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || Self::verify_blocking(&secret, &hash))
            .await
            .unwrap_or(false)
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> SecretHasher {
        SecretHasher::new(MIN_COST).unwrap()
    }

    #[test]
    fn test_cost_bounds() {
        assert!(SecretHasher::new(3).is_err());
        assert!(SecretHasher::new(32).is_err());
        assert_eq!(SecretHasher::new(4).unwrap().cost(), 4);
        assert_eq!(SecretHasher::default().cost(), bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast();
        let a = hasher.hash_blocking("same-secret").unwrap();
        let b = hasher.hash_blocking("same-secret").unwrap();
        assert_ne!(a, b);
        assert!(SecretHasher::verify_blocking("same-secret", &a));
        assert!(SecretHasher::verify_blocking("same-secret", &b));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let hash = fast().hash_blocking("right").unwrap();
        assert!(!SecretHasher::verify_blocking("wrong", &hash));
    }

    #[test]
    fn test_verify_fails_closed() {
        assert!(!SecretHasher::verify_blocking("anything", "not-a-bcrypt-hash"));
        assert!(!SecretHasher::verify_blocking("", ""));

        let hash = fast().hash_blocking("x").unwrap();
        assert!(!SecretHasher::verify_blocking("", &hash));
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let hasher = fast();
        let hash = hasher.hash("s3cret").await.unwrap();
        assert!(hasher.verify("s3cret", &hash).await);
        assert!(!hasher.verify("S3cret", &hash).await);
    }
}
