//! Result type alias for gate operations.

use super::gate_error::GateError;

/// Type alias for Results using [`GateError`].
///
/// # Example
///
/// ```ignore
/// use homeguard::error::GateResult;
///
/// async fn revoke(identity: &str) -> GateResult<()> {
///     store.revoke(identity).await?;
///     Ok(())
/// }
/// ```
pub type GateResult<T> = Result<T, GateError>;
