//! Error handling for the gate core.
//!
//! Every core operation returns a [`GateResult`]. Collaborator failures
//! (persistence, artifact storage, outbound HTTP) are lifted into
//! [`GateError`] through `From` impls so `?` works across the seams.
//!
//! # Propagation
//!
//! | Variant | Cause | Surfaced to caller |
//! |---------|-------|--------------------|
//! | `ValidationInput` | Malformed ttl, identity or secret | Yes |
//! | `NotFound` | No artifact for identity | Yes, as a negative result |
//! | `Storage` | Persistence or artifact store failed | Yes, operation aborted |
//! | `Notify` | Alarm signal delivery failed | No, logged by the notifier |
//!
//! Nothing in the core retries. The sweeper's interval is a fresh sweep,
//! not a retry of a failed one.

mod gate_error;
mod result;

pub use gate_error::GateError;
pub use result::GateResult;
