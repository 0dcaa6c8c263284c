//! Reqwest-based webhook client adapter.
//!
//! Production implementation of [`HttpClient`]. The underlying client is
//! built with a total request timeout so a dead endpoint can never hold a
//! caller for longer than that.

use async_trait::async_trait;
use std::time::Duration;

use crate::traits::{HttpClient, HttpError};

/// Webhook client implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use homeguard::adapters::ReqwestHttpClient;
///
/// let client = ReqwestHttpClient::with_timeout(Duration::from_secs(3))?;
/// let status = client.post("http://ha.local:8123/api/webhook/arm").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(Self::convert_error)?;
        Ok(Self { client })
    }

    /// Convert reqwest error to HttpError.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post(&self, url: &str) -> Result<u16, HttpError> {
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(Self::convert_error)?;
        Ok(response.status().as_u16())
    }
}
