//! Concrete implementations of the collaborator traits.
//!
//! # Adapters
//!
//! - [`FileCredentialRepository`] - JSON document of credential records
//! - [`FileArtifactStore`] - One file per identity under a directory
//! - [`QrPngRenderer`] - QR code PNGs of authentication links
//! - [`ReqwestHttpClient`] - Outbound HTTP using reqwest
//! - [`SystemClock`] - Wall-clock UTC time
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for all of the above:
//! - [`mock::InMemoryCredentialRepository`]
//! - [`mock::InMemoryArtifactStore`] and [`mock::StaticRenderer`]
//! - [`mock::MockHttpClient`]
//! - [`mock::ManualClock`]

pub mod file_artifacts;
pub mod file_credentials;
pub mod mock;
pub mod qr_renderer;
pub mod reqwest_http;
pub mod system_clock;

pub use file_artifacts::{FileArtifactStore, ARTIFACTS_DIR};
pub use file_credentials::{FileCredentialRepository, CREDENTIALS_FILE};
pub use mock::{
    InMemoryArtifactStore, InMemoryCredentialRepository, ManualClock, MockHttpClient,
    StaticRenderer,
};
pub use qr_renderer::QrPngRenderer;
pub use reqwest_http::ReqwestHttpClient;
pub use system_clock::SystemClock;
