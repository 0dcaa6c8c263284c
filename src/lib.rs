//! Homeguard - time-limited entry credentials with occupancy-driven alarm arming
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod auth;
pub mod error;
pub mod gate;
pub mod notifications;
pub mod occupancy;
pub mod startup;
pub mod sweeper;
pub mod traits;
