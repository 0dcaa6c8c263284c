//! Mock webhook client for testing.
//!
//! Records every POST and answers with a configured status or error,
//! optionally after a delay so timeout handling can be exercised.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{HttpClient, HttpError};

/// Configured answer of the mock.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Answer with this status code
    Status(u16),
    /// Fail with this error
    Error(HttpError),
}

/// Mock webhook client. Clones share configuration and recorded URLs.
///
/// # Example
///
/// ```ignore
/// use homeguard::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_response(MockResponse::Status(500));
///
/// client.post("http://ha.local/api/webhook/arm").await?;
/// assert_eq!(client.requested_urls(), vec!["http://ha.local/api/webhook/arm"]);
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    response: Arc<Mutex<MockResponse>>,
    requests: Arc<Mutex<Vec<String>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockHttpClient {
    /// Create a client that answers every request with `200`.
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(MockResponse::Status(200))),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Answer every following request with `response`.
    pub fn set_response(&self, response: MockResponse) {
        *self.response.lock().unwrap() = response;
    }

    /// Delay every answer by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// URLs of all recorded requests, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post(&self, url: &str) -> Result<u16, HttpError> {
        self.requests.lock().unwrap().push(url.to_string());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.response.lock().unwrap().clone() {
            MockResponse::Status(status) => Ok(status),
            MockResponse::Error(err) => Err(err),
        }
    }
}
