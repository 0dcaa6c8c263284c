//! In-memory artifact store and renderer for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;

use crate::traits::{
    ArtifactError, ArtifactRef, ArtifactRenderer, ArtifactStore, RenderError,
};

/// In-memory artifact store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactStore {
    /// Stored blobs by identity
    blobs: Arc<Mutex<HashMap<String, Bytes>>>,
    /// Whether save should fail
    save_should_fail: Arc<Mutex<bool>>,
    /// Whether remove should fail
    remove_should_fail: Arc<Mutex<bool>>,
    /// Delay applied to each remove
    remove_delay: Arc<Mutex<Option<Duration>>>,
}

impl InMemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether save should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether remove should fail.
    pub fn set_remove_should_fail(&self, should_fail: bool) {
        *self.remove_should_fail.lock().unwrap() = should_fail;
    }

    /// Delay every remove by `delay`.
    pub fn set_remove_delay(&self, delay: Duration) {
        *self.remove_delay.lock().unwrap() = Some(delay);
    }

    /// Insert a blob synchronously (for testing).
    pub fn insert(&self, identity: &str, bytes: Bytes) {
        self.blobs.lock().unwrap().insert(identity.to_string(), bytes);
    }

    /// Get a blob synchronously (for testing).
    pub fn get(&self, identity: &str) -> Option<Bytes> {
        self.blobs.lock().unwrap().get(identity).cloned()
    }

    /// Whether a blob exists for `identity`.
    pub fn contains(&self, identity: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(identity)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn save(&self, identity: &str, bytes: Bytes) -> Result<ArtifactRef, ArtifactError> {
        if *self.save_should_fail.lock().unwrap() {
            return Err(ArtifactError::Io("Mock save failure".to_string()));
        }
        self.insert(identity, bytes);
        Ok(ArtifactRef::for_identity(identity, "bin"))
    }

    async fn load(&self, identity: &str) -> Result<Bytes, ArtifactError> {
        self.get(identity)
            .ok_or_else(|| ArtifactError::NotFound(identity.to_string()))
    }

    async fn remove(&self, identity: &str) -> Result<bool, ArtifactError> {
        let delay = *self.remove_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.remove_should_fail.lock().unwrap() {
            return Err(ArtifactError::Io("Mock remove failure".to_string()));
        }
        Ok(self.blobs.lock().unwrap().remove(identity).is_some())
    }
}

/// Renderer that emits the payload bytes unchanged and records each payload
/// along with the thread it was rendered on.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    payloads: Arc<Mutex<Vec<String>>>,
    threads: Arc<Mutex<Vec<ThreadId>>>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every payload rendered so far, in order.
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    /// Threads each render ran on, in order.
    pub fn render_threads(&self) -> Vec<ThreadId> {
        self.threads.lock().unwrap().clone()
    }
}

impl ArtifactRenderer for StaticRenderer {
    fn render(&self, payload: &str) -> Result<Bytes, RenderError> {
        self.payloads.lock().unwrap().push(payload.to_string());
        self.threads.lock().unwrap().push(std::thread::current().id());
        Ok(Bytes::copy_from_slice(payload.as_bytes()))
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain"
    }
}
