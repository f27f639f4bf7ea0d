// Password hashing.

use campus_auth::AuthError;
use thiserror::Error;

/// bcrypt only looks at the first 72 bytes; longer secrets are refused
/// instead of being silently truncated.
pub const MAX_SECRET_BYTES: usize = 72;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("secret is longer than {MAX_SECRET_BYTES} bytes")]
    SecretTooLong,

    #[error("bcrypt cost {0} is outside {MIN_COST}..={MAX_COST}")]
    InvalidCost(u32),

    #[error("hashing failed: {0}")]
    Hash(String),
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::SecretTooLong => AuthError::malformed(format!(
                "password must be at most {MAX_SECRET_BYTES} bytes"
            )),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

/// Salted, slow password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialStore {
    cost: u32,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl CredentialStore {
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(CredentialError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash_blocking(&self, secret: &str) -> Result<String, CredentialError> {
        if secret.len() > MAX_SECRET_BYTES {
            return Err(CredentialError::SecretTooLong);
        }
        bcrypt::hash(secret, self.cost).map_err(|e| CredentialError::Hash(e.to_string()))
    }

    /// `false` on mismatch and on a digest that is not a bcrypt hash.
    pub fn verify_blocking(&self, secret: &str, digest: &str) -> bool {
        if secret.len() > MAX_SECRET_BYTES {
            return false;
        }
        bcrypt::verify(secret, digest).unwrap_or(false)
    }

    /// Hash on the blocking pool.
    pub async fn hash(&self, secret: &str) -> Result<String, CredentialError> {
        let store = *self;
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || store.hash_blocking(&secret))
            .await
            .map_err(|e| CredentialError::Hash(e.to_string()))?
    }

    /// Verify on the blocking pool.
    pub async fn verify(&self, secret: &str, digest: &str) -> bool {
        let store = *self;
        let secret = secret.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || store.verify_blocking(&secret, &digest))
            .await
            .unwrap_or(false)
    }

    /// Spend one bcrypt round at this store's cost and report no match.
    /// Used where no digest exists so the rejection costs the same as a
    /// wrong password.
    pub async fn verify_without_digest(&self, secret: &str) -> bool {
        let _ = self.hash(secret).await;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> CredentialStore {
        CredentialStore::new(MIN_COST).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let store = fast();
        let digest = store.hash_blocking("correct horse").unwrap();
        assert_ne!(digest, "correct horse");
        assert!(store.verify_blocking("correct horse", &digest));
        assert!(!store.verify_blocking("battery staple", &digest));
    }

    #[test]
    fn hashes_are_salted() {
        let store = fast();
        let a = store.hash_blocking("same").unwrap();
        let b = store.hash_blocking("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_does_not_verify() {
        assert!(!fast().verify_blocking("secret", "not-a-bcrypt-hash"));
        assert!(!fast().verify_blocking("secret", ""));
    }

    #[test]
    fn long_secrets_are_refused() {
        let long = "x".repeat(MAX_SECRET_BYTES + 1);
        assert!(matches!(
            fast().hash_blocking(&long),
            Err(CredentialError::SecretTooLong)
        ));
        assert!(fast().hash_blocking(&"x".repeat(MAX_SECRET_BYTES)).is_ok());
        assert!(matches!(
            AuthError::from(CredentialError::SecretTooLong),
            AuthError::MalformedInput { .. }
        ));
    }

    #[test]
    fn cost_is_range_checked() {
        assert!(matches!(CredentialStore::new(3), Err(CredentialError::InvalidCost(3))));
        assert!(CredentialStore::new(32).is_err());
        assert_eq!(CredentialStore::default().cost(), bcrypt::DEFAULT_COST);
    }

    #[tokio::test]
    async fn missing_digest_never_verifies() {
        let store = fast();
        assert!(!store.verify_without_digest("anything").await);
        assert!(!store.verify_without_digest(&"x".repeat(MAX_SECRET_BYTES + 1)).await);
    }

    #[tokio::test]
    async fn async_wrappers_use_the_blocking_pool() {
        let store = fast();
        let digest = store.hash("pw").await.unwrap();
        assert!(store.verify("pw", &digest).await);
        assert!(!store.verify("nope", &digest).await);
    }
}
