//! Credential persistence trait abstraction.
//!
//! The repository is a plain key-value collaborator keyed by identity.
//! Each method must be atomic on its own; the store above it composes them
//! so no multi-call transaction is needed.

use async_trait::async_trait;

use crate::auth::Credential;

/// Predicate used by [`CredentialRepository::scan`] and
/// [`CredentialRepository::delete_where`].
pub type RecordPredicate<'a> = &'a (dyn Fn(&Credential) -> bool + Send + Sync);

/// Persistence operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backing store could not be read
    ReadFailed(String),
    /// Backing store could not be written
    WriteFailed(String),
    /// Backing store content could not be decoded
    Corrupt(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ReadFailed(msg) => write!(f, "Failed to read credentials: {}", msg),
            StorageError::WriteFailed(msg) => write!(f, "Failed to write credentials: {}", msg),
            StorageError::Corrupt(msg) => write!(f, "Credential store is corrupt: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Trait for credential record persistence.
///
/// # Example
///
/// ```ignore
/// use homeguard::traits::CredentialRepository;
///
/// async fn count_live<R: CredentialRepository>(repo: &R, now: DateTime<Utc>) -> usize {
///     repo.scan(&|c| !c.is_expired_at(now)).await.map(|v| v.len()).unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Fetch the record for `identity`, if any.
    async fn get(&self, identity: &str) -> Result<Option<Credential>, StorageError>;

    /// Insert or replace the record keyed by `credential.identity`.
    ///
    /// Replacement is a single atomic step: readers see either the old
    /// record or the new one, never neither.
    ///
    /// # Returns
    /// The record that was replaced, if one existed.
    async fn put(&self, credential: Credential) -> Result<Option<Credential>, StorageError>;

    /// Remove the record for `identity`.
    ///
    /// # Returns
    /// `true` if a record existed and was removed.
    async fn delete(&self, identity: &str) -> Result<bool, StorageError>;

    /// Return every record matching `predicate`.
    async fn scan(&self, predicate: RecordPredicate<'_>) -> Result<Vec<Credential>, StorageError>;

    /// Atomically remove every record matching `predicate`.
    ///
    /// # Returns
    /// The removed records.
    async fn delete_where(
        &self,
        predicate: RecordPredicate<'_>,
    ) -> Result<Vec<Credential>, StorageError>;
}
