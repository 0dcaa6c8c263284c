//! Credential records and the store that owns their lifecycle.
//!
//! A credential maps one identity to a bcrypt hash of a random secret and
//! an absolute expiry. The store keeps at most one per identity: issuing
//! again supersedes the previous secret in a single upsert.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::hasher::SecretHasher;
use crate::error::{GateError, GateResult};
use crate::traits::{ArtifactStore, Clock, CredentialRepository};

/// Longest identity accepted, in bytes.
pub const MAX_IDENTITY_LEN: usize = 128;

/// Persisted credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique, case-sensitive key.
    pub identity: String,
    /// bcrypt hash of the secret. The plaintext is never stored.
    pub secret_hash: String,
    /// Absolute expiry. The credential is dead from this instant on.
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the credential no longer validates at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a successful issue.
///
/// Carries the plaintext secret. It is handed out exactly once; the store
/// keeps only the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub identity: String,
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Check that `identity` is usable as a key and as an artifact file name.
pub fn validate_identity(identity: &str) -> GateResult<()> {
    if identity.is_empty() {
        return Err(GateError::ValidationInput("identity is empty".to_string()));
    }
    if identity.len() > MAX_IDENTITY_LEN {
        return Err(GateError::ValidationInput(format!(
            "identity longer than {} bytes",
            MAX_IDENTITY_LEN
        )));
    }
    if identity == "." || identity == ".." || identity.contains(['/', '\\', '\0']) {
        return Err(GateError::ValidationInput(format!(
            "identity '{}' contains path characters",
            identity.escape_debug()
        )));
    }
    Ok(())
}

/// Owns issue, validation, revocation and expiry sweeps of credentials.
///
/// Per-identity operations rely on the repository's atomic primitives, so
/// calls for different identities run fully in parallel. Sweeps are
/// serialized per store by an internal guard.
pub struct CredentialStore {
    repository: Arc<dyn CredentialRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    hasher: SecretHasher,
    clock: Arc<dyn Clock>,
    sweep_guard: Mutex<()>,
}

impl CredentialStore {
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        hasher: SecretHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            artifacts,
            hasher,
            clock,
            sweep_guard: Mutex::new(()),
        }
    }

    /// The clock expiry decisions are made against.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issue a fresh secret for `identity`, valid for `ttl` from now.
    ///
    /// The new record is fully built (secret generated, hash computed)
    /// before anything is written, and then stored with one upsert. If that
    /// write fails, the previous credential is left untouched.
    ///
    /// # Errors
    /// - `ValidationInput` for a bad identity, a non-positive ttl, or a ttl
    ///   whose expiry is not representable
    /// - `Storage` if hashing or persistence fails
    pub async fn issue(&self, identity: &str, ttl: Duration) -> GateResult<IssuedCredential> {
        validate_identity(identity)?;
        if ttl <= Duration::zero() {
            return Err(GateError::ValidationInput("ttl must be positive".to_string()));
        }
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| GateError::ValidationInput("ttl out of range".to_string()))?;

        let secret = Uuid::new_v4().to_string();
        let secret_hash = self.hasher.hash(&secret).await?;

        self.repository
            .put(Credential {
                identity: identity.to_string(),
                secret_hash,
                expires_at,
            })
            .await?;

        Ok(IssuedCredential {
            identity: identity.to_string(),
            secret,
            expires_at,
        })
    }

    /// Check `secret` against the stored credential for `identity`.
    ///
    /// Fails closed: an empty secret, an unknown identity or an expired
    /// credential all yield `Ok(false)`. Never mutates state.
    ///
    /// # Errors
    /// `Storage` if the repository cannot be read.
    pub async fn validate(&self, identity: &str, secret: &str) -> GateResult<bool> {
        if secret.is_empty() || validate_identity(identity).is_err() {
            return Ok(false);
        }
        let Some(credential) = self.repository.get(identity).await? else {
            return Ok(false);
        };
        if credential.is_expired_at(self.clock.now()) {
            return Ok(false);
        }
        Ok(self.hasher.verify(secret, &credential.secret_hash).await)
    }

    /// Remove the credential and artifact for `identity`.
    ///
    /// Idempotent: succeeds whether or not anything was stored.
    ///
    /// # Returns
    /// `true` if a credential record existed.
    pub async fn revoke(&self, identity: &str) -> GateResult<bool> {
        validate_identity(identity)?;
        let existed = self.repository.delete(identity).await?;
        self.artifacts.remove(identity).await?;
        Ok(existed)
    }

    /// Remove every credential with `expires_at <= now`, and its artifact.
    ///
    /// Records are removed in one atomic repository call; artifacts are
    /// removed afterwards. An artifact that cannot be removed is reported
    /// in the outcome and does not stop the sweep.
    pub async fn sweep(&self, now: DateTime<Utc>) -> GateResult<SweepOutcome> {
        let _guard = self.sweep_guard.lock().await;

        let removed = self
            .repository
            .delete_where(&|c: &Credential| c.is_expired_at(now))
            .await?;

        let mut outcome = SweepOutcome {
            removed: Vec::with_capacity(removed.len()),
            artifact_failures: Vec::new(),
        };
        for credential in removed {
            if let Err(err) = self.artifacts.remove(&credential.identity).await {
                outcome
                    .artifact_failures
                    .push((credential.identity.clone(), err.to_string()));
            }
            outcome.removed.push(credential.identity);
        }
        Ok(outcome)
    }

    /// Sweep against the store's clock.
    pub async fn sweep_now(&self) -> GateResult<SweepOutcome> {
        let now = self.clock.now();
        self.sweep(now).await
    }
}

/// What a sweep removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Identities whose credential was removed.
    pub removed: Vec<String>,
    /// Identities whose artifact could not be removed, with the reason.
    pub artifact_failures: Vec<(String, String)>,
}

impl SweepOutcome {
    /// Number of credentials removed.
    pub fn count(&self) -> usize {
        self.removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryArtifactStore, InMemoryCredentialRepository, ManualClock};
    use crate::auth::hasher::MIN_COST;
    use bytes::Bytes;

    struct Fixture {
        store: CredentialStore,
        repo: InMemoryCredentialRepository,
        artifacts: InMemoryArtifactStore,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        let repo = InMemoryCredentialRepository::new();
        let artifacts = InMemoryArtifactStore::new();
        let clock = ManualClock::new("2026-01-01T00:00:00Z".parse().unwrap());
        let store = CredentialStore::new(
            Arc::new(repo.clone()),
            Arc::new(artifacts.clone()),
            SecretHasher::new(MIN_COST).unwrap(),
            Arc::new(clock.clone()),
        );
        Fixture {
            store,
            repo,
            artifacts,
            clock,
        }
    }

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity("alice").is_ok());
        assert!(validate_identity("Alice Smith").is_ok());
        assert!(validate_identity("").is_err());
        assert!(validate_identity(".").is_err());
        assert!(validate_identity("..").is_err());
        assert!(validate_identity("a/b").is_err());
        assert!(validate_identity("a\\b").is_err());
        assert!(validate_identity("a\0b").is_err());
        assert!(validate_identity(&"x".repeat(MAX_IDENTITY_LEN + 1)).is_err());
    }

    #[test]
    fn test_issued_credential_debug_redacts_secret() {
        let issued = IssuedCredential {
            identity: "alice".to_string(),
            secret: "top-secret".to_string(),
            expires_at: Utc::now(),
        };
        let debug = format!("{:?}", issued);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_issue_then_validate() {
        let f = fixture();
        let issued = f.store.issue("alice", Duration::hours(1)).await.unwrap();

        assert_eq!(issued.expires_at, f.clock.now() + Duration::hours(1));
        assert!(f.store.validate("alice", &issued.secret).await.unwrap());

        let stored = f.repo.get_record("alice").unwrap();
        assert_ne!(stored.secret_hash, issued.secret);
    }

    #[tokio::test]
    async fn test_validate_fails_after_expiry() {
        let f = fixture();
        let issued = f.store.issue("alice", Duration::hours(1)).await.unwrap();

        f.clock.advance(Duration::hours(2));
        assert!(!f.store.validate("alice", &issued.secret).await.unwrap());
    }

    #[tokio::test]
    async fn test_validate_fails_exactly_at_expiry() {
        let f = fixture();
        let issued = f.store.issue("alice", Duration::hours(1)).await.unwrap();

        f.clock.advance(Duration::hours(1));
        assert!(!f.store.validate("alice", &issued.secret).await.unwrap());
    }

    #[tokio::test]
    async fn test_validate_rejects_empty_wrong_and_unknown() {
        let f = fixture();
        f.store.issue("alice", Duration::hours(1)).await.unwrap();

        assert!(!f.store.validate("alice", "").await.unwrap());
        assert!(!f.store.validate("alice", "wrong-secret").await.unwrap());
        assert!(!f.store.validate("bob", "anything").await.unwrap());
        assert!(!f.store.validate("../alice", "anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_identity_is_case_sensitive() {
        let f = fixture();
        let issued = f.store.issue("alice", Duration::hours(1)).await.unwrap();
        assert!(!f.store.validate("Alice", &issued.secret).await.unwrap());
    }

    #[tokio::test]
    async fn test_reissue_invalidates_old_secret() {
        let f = fixture();
        let first = f.store.issue("alice", Duration::hours(1)).await.unwrap();
        let second = f.store.issue("alice", Duration::hours(1)).await.unwrap();

        assert_ne!(first.secret, second.secret);
        assert!(!f.store.validate("alice", &first.secret).await.unwrap());
        assert!(f.store.validate("alice", &second.secret).await.unwrap());
        assert_eq!(f.repo.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reissue_keeps_old_credential() {
        let f = fixture();
        let first = f.store.issue("alice", Duration::hours(1)).await.unwrap();

        f.repo.set_write_should_fail(true);
        let result = f.store.issue("alice", Duration::hours(1)).await;
        assert!(matches!(result, Err(GateError::Storage(_))));

        f.repo.set_write_should_fail(false);
        assert!(f.store.validate("alice", &first.secret).await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_rejects_bad_input() {
        let f = fixture();
        assert!(matches!(
            f.store.issue("", Duration::hours(1)).await,
            Err(GateError::ValidationInput(_))
        ));
        assert!(matches!(
            f.store.issue("alice", Duration::zero()).await,
            Err(GateError::ValidationInput(_))
        ));
        assert!(matches!(
            f.store.issue("alice", Duration::hours(-1)).await,
            Err(GateError::ValidationInput(_))
        ));
        assert!(matches!(
            f.store.issue("alice", Duration::MAX).await,
            Err(GateError::ValidationInput(_))
        ));
        assert_eq!(f.repo.len(), 0);
    }

    #[tokio::test]
    async fn test_validate_surfaces_storage_failure() {
        let f = fixture();
        f.repo.set_read_should_fail(true);
        assert!(matches!(
            f.store.validate("alice", "secret").await,
            Err(GateError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_revoke_removes_record_and_artifact() {
        let f = fixture();
        let issued = f.store.issue("alice", Duration::hours(1)).await.unwrap();
        f.artifacts.insert("alice", Bytes::from_static(b"png"));

        assert!(f.store.revoke("alice").await.unwrap());
        assert!(!f.store.validate("alice", &issued.secret).await.unwrap());
        assert!(f.repo.get_record("alice").is_none());
        assert!(!f.artifacts.contains("alice"));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let f = fixture();
        assert!(!f.store.revoke("ghost").await.unwrap());
        assert!(!f.store.revoke("ghost").await.unwrap());
        assert_eq!(f.repo.len(), 0);
        assert!(f.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let f = fixture();
        f.store.issue("a", Duration::hours(1)).await.unwrap();
        f.store.issue("b", Duration::hours(48)).await.unwrap();
        f.artifacts.insert("a", Bytes::from_static(b"a"));
        f.artifacts.insert("b", Bytes::from_static(b"b"));

        f.clock.advance(Duration::hours(2));
        let outcome = f.store.sweep_now().await.unwrap();

        assert_eq!(outcome.count(), 1);
        assert_eq!(outcome.removed, vec!["a".to_string()]);
        assert!(outcome.artifact_failures.is_empty());
        assert!(f.repo.get_record("a").is_none());
        assert!(f.repo.get_record("b").is_some());
        assert!(!f.artifacts.contains("a"));
        assert!(f.artifacts.contains("b"));
    }

    #[tokio::test]
    async fn test_sweep_boundary_is_inclusive() {
        let f = fixture();
        let issued = f.store.issue("a", Duration::hours(1)).await.unwrap();

        let outcome = f.store.sweep(issued.expires_at).await.unwrap();
        assert_eq!(outcome.count(), 1);
    }

    #[tokio::test]
    async fn test_sweep_reports_artifact_failures() {
        let f = fixture();
        f.store.issue("a", Duration::hours(1)).await.unwrap();
        f.artifacts.set_remove_should_fail(true);

        f.clock.advance(Duration::hours(2));
        let outcome = f.store.sweep_now().await.unwrap();

        assert_eq!(outcome.count(), 1);
        assert_eq!(outcome.artifact_failures.len(), 1);
        assert_eq!(outcome.artifact_failures[0].0, "a");
        assert!(f.repo.get_record("a").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_issue_for_different_identities() {
        let f = fixture();
        let store = Arc::new(f.store);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .issue(&format!("user-{}", i), Duration::hours(1))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            let issued = handle.await.unwrap();
            assert!(store.validate(&issued.identity, &issued.secret).await.unwrap());
        }
        assert_eq!(f.repo.len(), 8);
    }
}
