//! Directory-backed artifact store.
//!
//! Each identity's artifact is a single file `<dir>/<identity>.<ext>`.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::auth::validate_identity;
use crate::traits::{ArtifactError, ArtifactRef, ArtifactStore};

/// The artifacts directory name under the data directory.
pub const ARTIFACTS_DIR: &str = "artifacts";

/// File-based artifact store.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
    extension: &'static str,
}

impl FileArtifactStore {
    /// Create a store rooted at `dir` writing files with `extension`.
    ///
    /// The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>, extension: &'static str) -> Self {
        Self {
            dir: dir.into(),
            extension,
        }
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for `identity`.
    pub fn path_for(&self, identity: &str) -> Result<PathBuf, ArtifactError> {
        validate_identity(identity)
            .map_err(|_| ArtifactError::InvalidName(identity.escape_debug().to_string()))?;
        Ok(self.dir.join(format!("{}.{}", identity, self.extension)))
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn save(&self, identity: &str, bytes: Bytes) -> Result<ArtifactRef, ArtifactError> {
        let path = self.path_for(identity)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", self.dir.display(), e)))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(ArtifactRef::for_identity(identity, self.extension))
    }

    async fn load(&self, identity: &str) -> Result<Bytes, ArtifactError> {
        let path = self.path_for(identity)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ArtifactError::NotFound(identity.to_string()))
            }
            Err(e) => Err(ArtifactError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    async fn remove(&self, identity: &str) -> Result<bool, ArtifactError> {
        let path = self.path_for(identity)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ArtifactError::Io(format!("{}: {}", path.display(), e))),
        }
    }
}
