//! Mock implementations for testing.
//!
//! Test doubles for every collaborator trait, usable without a disk,
//! network or real clock.
//!
//! # Available Mocks
//!
//! - [`InMemoryCredentialRepository`] - In-memory credential records
//! - [`InMemoryArtifactStore`] - In-memory artifact blobs
//! - [`StaticRenderer`] - Renders the payload as-is
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`ManualClock`] - Clock advanced by hand

pub mod artifacts;
pub mod clock;
pub mod credentials;
pub mod http;

pub use artifacts::{InMemoryArtifactStore, StaticRenderer};
pub use clock::ManualClock;
pub use credentials::InMemoryCredentialRepository;
pub use http::{MockHttpClient, MockResponse};
