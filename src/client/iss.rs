//! ISS client
//!
//! Fetches an endpoint through a [`Transport`], rejects non-200 responses
//! and runs the payload through the decoding pipeline with the endpoint's
//! transform and the client's output mode.

use super::endpoint::{CandlesQuery, Endpoint, SecuritiesQuery};
use super::transport::{HttpTransport, RawResponse, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::output::Rendered;
use crate::pipeline::{process, PipelineConfig};
use crate::types::{OutputMode, QueryParams};
use tracing::debug;

/// Characters of an error body kept in [`Error::HttpStatus`]
pub const ERROR_BODY_LIMIT: usize = 100;

/// Client for the Moscow Exchange ISS API
#[derive(Debug)]
pub struct IssClient<T: Transport = HttpTransport> {
    transport: T,
    output: OutputMode,
    lang: Option<String>,
}

impl IssClient<HttpTransport> {
    /// Build an HTTP backed client from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(config)?;
        let mut client = Self::new(transport, config.output_mode);
        client.lang = config.lang.clone();
        Ok(client)
    }
}

impl<T: Transport> IssClient<T> {
    /// Create a client over a transport
    pub fn new(transport: T, output: OutputMode) -> Self {
        Self {
            transport,
            output,
            lang: None,
        }
    }

    /// Send this language to every endpoint that accepts one
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Output mode of every call
    pub fn output_mode(&self) -> OutputMode {
        self.output
    }

    /// Language override, if any
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch an endpoint and return its raw payload
    pub async fn fetch_payload(&self, endpoint: &Endpoint) -> Result<String> {
        let endpoint = self.localize(endpoint);
        let path = endpoint.path();
        let params = endpoint.params();

        debug!(endpoint = endpoint.name(), path = %path, "fetching");
        let response = self.transport.fetch(&path, &params).await?;
        check_status(response)
    }

    /// Fetch an endpoint and decode it
    pub async fn request(&self, endpoint: &Endpoint) -> Result<Rendered> {
        let payload = self.fetch_payload(endpoint).await?;
        let config = PipelineConfig::new(endpoint.transform_mode(), self.output);
        process(&payload, &config)
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Securities traded on the exchange
    pub async fn securities(&self, query: SecuritiesQuery) -> Result<Rendered> {
        self.request(&Endpoint::Securities(query)).await
    }

    /// Specification of one instrument, pivoted into a single record
    pub async fn security(&self, ticker: &str) -> Result<Rendered> {
        self.request(&Endpoint::security(ticker)).await
    }

    /// Indices that include a security
    pub async fn sec_indices(&self, ticker: &str, only_actual: bool) -> Result<Rendered> {
        self.request(&Endpoint::sec_indices(ticker, only_actual))
            .await
    }

    /// Exchange news
    pub async fn sitenews(&self, start: u32) -> Result<Rendered> {
        self.request(&Endpoint::sitenews(start)).await
    }

    /// Exchange events
    pub async fn events(&self, start: u32) -> Result<Rendered> {
        self.request(&Endpoint::events(start)).await
    }

    /// Trading systems
    pub async fn engines(&self) -> Result<Rendered> {
        self.request(&Endpoint::engines()).await
    }

    /// Markets of a trading system
    pub async fn markets(&self, engine: &str) -> Result<Rendered> {
        self.request(&Endpoint::markets(engine)).await
    }

    /// Trading modes of a market
    pub async fn boards(&self, engine: &str, market: &str) -> Result<Rendered> {
        self.request(&Endpoint::boards(engine, market)).await
    }

    /// Candles of a security
    pub async fn candles(&self, query: CandlesQuery) -> Result<Rendered> {
        self.request(&Endpoint::Candles(query)).await
    }

    /// Any other ISS resource
    pub async fn other_endpoint(&self, endpoint: &str, params: QueryParams) -> Result<Rendered> {
        self.request(&Endpoint::other(endpoint, params)).await
    }

    fn localize(&self, endpoint: &Endpoint) -> Endpoint {
        match &self.lang {
            Some(lang) => endpoint.clone().with_lang(lang.clone()),
            None => endpoint.clone(),
        }
    }
}

/// Accept only 200 responses, keeping the start of any other body
fn check_status(response: RawResponse) -> Result<String> {
    if response.status == 200 {
        return Ok(response.body);
    }
    let snippet: String = response.body.chars().take(ERROR_BODY_LIMIT).collect();
    Err(Error::http_status(response.status, snippet))
}
