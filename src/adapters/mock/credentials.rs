//! In-memory credential repository for testing.
//!
//! Stores records in a map behind one mutex, so every trait method is
//! atomic exactly as the file-backed repository is.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auth::Credential;
use crate::traits::{CredentialRepository, RecordPredicate, StorageError};

/// In-memory credential repository for testing.
///
/// # Example
///
/// ```ignore
/// use homeguard::adapters::mock::InMemoryCredentialRepository;
///
/// let repo = InMemoryCredentialRepository::new();
/// repo.set_write_should_fail(true);
/// assert!(repo.put(credential).await.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryCredentialRepository {
    /// Stored records by identity
    records: Arc<Mutex<HashMap<String, Credential>>>,
    /// Whether reads should fail
    read_should_fail: Arc<Mutex<bool>>,
    /// Whether writes (put, delete, delete_where) should fail
    write_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryCredentialRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            read_should_fail: Arc::new(Mutex::new(false)),
            write_should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Configure whether reads should fail.
    pub fn set_read_should_fail(&self, should_fail: bool) {
        *self.read_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether writes should fail.
    pub fn set_write_should_fail(&self, should_fail: bool) {
        *self.write_should_fail.lock().unwrap() = should_fail;
    }

    /// Get a record synchronously (for testing).
    pub fn get_record(&self, identity: &str) -> Option<Credential> {
        self.records.lock().unwrap().get(identity).cloned()
    }

    /// Insert a record synchronously (for testing).
    pub fn insert_record(&self, credential: Credential) {
        self.records
            .lock()
            .unwrap()
            .insert(credential.identity.clone(), credential);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_read(&self) -> Result<(), StorageError> {
        if *self.read_should_fail.lock().unwrap() {
            return Err(StorageError::ReadFailed("Mock read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if *self.write_should_fail.lock().unwrap() {
            return Err(StorageError::WriteFailed("Mock write failure".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryCredentialRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn get(&self, identity: &str) -> Result<Option<Credential>, StorageError> {
        self.check_read()?;
        Ok(self.get_record(identity))
    }

    async fn put(&self, credential: Credential) -> Result<Option<Credential>, StorageError> {
        self.check_write()?;
        let mut records = self.records.lock().unwrap();
        Ok(records.insert(credential.identity.clone(), credential))
    }

    async fn delete(&self, identity: &str) -> Result<bool, StorageError> {
        self.check_write()?;
        Ok(self.records.lock().unwrap().remove(identity).is_some())
    }

    async fn scan(&self, predicate: RecordPredicate<'_>) -> Result<Vec<Credential>, StorageError> {
        self.check_read()?;
        let records = self.records.lock().unwrap();
        Ok(records.values().filter(|c| predicate(c)).cloned().collect())
    }

    async fn delete_where(
        &self,
        predicate: RecordPredicate<'_>,
    ) -> Result<Vec<Credential>, StorageError> {
        self.check_write()?;
        let mut records = self.records.lock().unwrap();
        let doomed: Vec<String> = records
            .values()
            .filter(|c| predicate(c))
            .map(|c| c.identity.clone())
            .collect();
        Ok(doomed
            .iter()
            .filter_map(|identity| records.remove(identity))
            .collect())
    }
}
