//! File-backed credential repository.
//!
//! All records live in one JSON document (`credentials.json`). The document
//! is loaded once on open and kept in memory; every mutation writes the full
//! document to a sibling temp file, syncs it to disk and renames it over the
//! existing one, and the in-memory copy is only updated once that rename
//! succeeded. A failed write
//! therefore leaves both disk and memory at the previous state.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::auth::Credential;
use crate::traits::{CredentialRepository, RecordPredicate, StorageError};

/// The credentials file name.
pub const CREDENTIALS_FILE: &str = "credentials.json";

type Records = BTreeMap<String, Credential>;

/// File-based credential repository.
///
/// # Example
///
/// ```ignore
/// use homeguard::adapters::FileCredentialRepository;
///
/// let repo = FileCredentialRepository::open(data_dir.join("credentials.json")).await?;
/// let alice = repo.get("alice").await?;
/// ```
#[derive(Debug)]
pub struct FileCredentialRepository {
    path: PathBuf,
    records: Mutex<Records>,
}

impl FileCredentialRepository {
    /// Open the repository at `path`, loading any existing document.
    ///
    /// A missing or empty file is an empty repository. An unreadable or
    /// undecodable file is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Records::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Records::new(),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!("{}: {}", path.display(), e)));
            }
        };
        tracing::debug!(
            "Loaded {} credential records from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Path to the credentials document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &Records) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::WriteFailed(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        let write_tmp = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&json).await?;
            file.sync_all().await
        };
        write_tmp
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl CredentialRepository for FileCredentialRepository {
    async fn get(&self, identity: &str) -> Result<Option<Credential>, StorageError> {
        Ok(self.records.lock().await.get(identity).cloned())
    }

    async fn put(&self, credential: Credential) -> Result<Option<Credential>, StorageError> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        let previous = next.insert(credential.identity.clone(), credential);
        self.persist(&next).await?;
        *records = next;
        Ok(previous)
    }

    async fn delete(&self, identity: &str) -> Result<bool, StorageError> {
        let mut records = self.records.lock().await;
        if !records.contains_key(identity) {
            return Ok(false);
        }
        let mut next = records.clone();
        next.remove(identity);
        self.persist(&next).await?;
        *records = next;
        Ok(true)
    }

    async fn scan(&self, predicate: RecordPredicate<'_>) -> Result<Vec<Credential>, StorageError> {
        let records = self.records.lock().await;
        Ok(records.values().filter(|c| predicate(c)).cloned().collect())
    }

    async fn delete_where(
        &self,
        predicate: RecordPredicate<'_>,
    ) -> Result<Vec<Credential>, StorageError> {
        let mut records = self.records.lock().await;
        let (removed, kept): (Records, Records) =
            records.clone().into_iter().partition(|(_, c)| predicate(c));
        if removed.is_empty() {
            return Ok(Vec::new());
        }
        self.persist(&kept).await?;
        *records = kept;
        Ok(removed.into_values().collect())
    }
}
