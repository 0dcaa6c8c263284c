//! Trait abstractions for the gate's external collaborators.
//!
//! The core never talks to a disk, a network or the system clock directly;
//! it goes through these seams so tests can swap in the doubles from
//! [`crate::adapters::mock`].
//!
//! # Traits
//!
//! - [`CredentialRepository`] - Key-value persistence of credential records
//! - [`ArtifactStore`] - One rendered-secret blob per identity
//! - [`ArtifactRenderer`] - Turns an authentication link into a shareable image
//! - [`HttpClient`] - Outbound POST for alarm signals
//! - [`Clock`] - Source of "now" for expiry decisions

pub mod artifacts;
pub mod clock;
pub mod http;
pub mod renderer;
pub mod storage;

pub use artifacts::{ArtifactError, ArtifactRef, ArtifactStore};
pub use clock::Clock;
pub use http::{is_success, HttpClient, HttpError};
pub use renderer::{ArtifactRenderer, RenderError};
pub use storage::{CredentialRepository, RecordPredicate, StorageError};
