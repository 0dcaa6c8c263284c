//! Credential lifecycle for the gate.
//!
//! This module provides:
//! - [`SecretHasher`] - bcrypt hashing and verification of secrets
//! - [`Credential`] - the persisted `{identity, secret_hash, expires_at}` record
//! - [`CredentialStore`] - issue, validate, revoke and sweep

pub mod credentials;
pub mod hasher;

pub use credentials::{
    validate_identity, Credential, CredentialStore, IssuedCredential, SweepOutcome,
};
pub use hasher::SecretHasher;
