//! Transport seam between the endpoint layer and the network

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpClient, TextResponse};
use crate::types::QueryParams;
use async_trait::async_trait;

/// Status and body of a fetched resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl RawResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

impl From<TextResponse> for RawResponse {
    fn from(response: TextResponse) -> Self {
        Self {
            status: response.status,
            body: response.body,
        }
    }
}

/// Fetches ISS resources
///
/// Implementations return every response they receive, whatever its status.
/// Deciding which statuses are usable belongs to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a path relative to the service root
    async fn fetch(&self, path: &str, params: &QueryParams) -> Result<RawResponse>;
}

/// Transport over the retrying HTTP client
#[derive(Debug)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    /// Wrap an HTTP client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build the HTTP client from client configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::with_config(config.to_http_config())?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, path: &str, params: &QueryParams) -> Result<RawResponse> {
        let response = self.client.get_text(path, params).await?;
        Ok(response.into())
    }
}
