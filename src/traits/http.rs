//! Outbound webhook trait abstraction.
//!
//! The only outbound HTTP the gate performs is an empty-bodied POST to an
//! alarm webhook, and only the status code matters.

use async_trait::async_trait;

/// Webhook delivery errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Whether `status` is a 2xx code.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Trait for posting to a webhook.
///
/// # Example
///
/// ```ignore
/// use homeguard::traits::{is_success, HttpClient, HttpError};
///
/// async fn ping<C: HttpClient>(client: &C) -> Result<bool, HttpError> {
///     Ok(is_success(client.post("http://ha.local/api/webhook/x").await?))
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST an empty body to `url`.
    ///
    /// # Returns
    /// The response status. Non-2xx statuses are returned as `Ok`.
    async fn post(&self, url: &str) -> Result<u16, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(199));
        assert!(!is_success(300));
        assert!(!is_success(404));
        assert!(!is_success(500));
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            HttpError::Timeout("3s".to_string()).to_string(),
            "Request timeout: 3s"
        );
        assert_eq!(
            HttpError::InvalidUrl("bad url".to_string()).to_string(),
            "Invalid URL: bad url"
        );
        assert_eq!(
            HttpError::Other("unknown".to_string()).to_string(),
            "HTTP error: unknown"
        );
    }
}
