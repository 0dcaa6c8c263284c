//! Artifact storage trait abstraction.
//!
//! An artifact is the rendered, shareable form of a freshly issued secret
//! (a QR code PNG in production). There is at most one per identity and it
//! lives exactly as long as the credential it was rendered for.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

/// Name under which an identity's artifact can be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRef(pub String);

impl ArtifactRef {
    /// Reference for `identity` with the given file extension.
    pub fn for_identity(identity: &str, extension: &str) -> Self {
        Self(format!("{}.{}", identity, extension))
    }

    /// The reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Artifact storage errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// No artifact stored for this identity
    NotFound(String),
    /// Identity cannot be used as an artifact name
    InvalidName(String),
    /// IO error
    Io(String),
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactError::NotFound(identity) => write!(f, "No artifact for '{}'", identity),
            ArtifactError::InvalidName(name) => write!(f, "Invalid artifact name: {}", name),
            ArtifactError::Io(msg) => write!(f, "Artifact IO error: {}", msg),
        }
    }
}

impl std::error::Error for ArtifactError {}

/// Trait for per-identity artifact blobs.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` as the artifact for `identity`, replacing any previous one.
    async fn save(&self, identity: &str, bytes: Bytes) -> Result<ArtifactRef, ArtifactError>;

    /// Load the artifact for `identity`.
    ///
    /// # Returns
    /// The bytes, or [`ArtifactError::NotFound`] if nothing is stored.
    async fn load(&self, identity: &str) -> Result<Bytes, ArtifactError>;

    /// Remove the artifact for `identity`.
    ///
    /// # Returns
    /// `true` if an artifact existed and was removed.
    async fn remove(&self, identity: &str) -> Result<bool, ArtifactError>;
}
