//! Retrying text client for ISS
//!
//! Each request first takes a permit from the rate limiter. 429 and 5xx
//! responses, timeouts and refused connections are retried with backoff.
//! Every other response is returned as is, whatever its status, so the
//! endpoint layer can report it.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::{BackoffType, QueryParams};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("moex-iss/", env!("CARGO_PKG_VERSION"));

/// Settings of the HTTP client
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientConfig {
    /// Service root every request path is joined to
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff: BackoffType,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Request budget; unlimited when `None`
    pub rate_limit: Option<RateLimiterConfig>,
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Delay after failed attempt number `attempt` (zero based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_backoff
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_backoff)
    }
}

/// A response body with its status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub status: u16,
    pub body: String,
}

/// What one request attempt came to
enum Attempt {
    Done(TextResponse),
    Retry { reason: String, wait: Duration },
    Failed(Error),
}

/// HTTP client with retry and rate limiting
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Build a client from its settings
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// GET a path under the service root and read the body as text
    ///
    /// Fails with [`Error::RateLimited`] when the service still answers 429
    /// on the last attempt, and with [`Error::Timeout`] or [`Error::Http`]
    /// when no response arrives at all.
    pub async fn get_text(&self, path: &str, query: &QueryParams) -> Result<TextResponse> {
        let url = self.url_for(path);
        let mut attempt = 0;

        loop {
            if let Some(limiter) = &self.rate_limiter {
                if limiter.acquire().await {
                    debug!(%url, "request delayed by rate limit");
                }
            }

            match self.attempt(&url, query, attempt).await {
                Attempt::Done(response) => {
                    debug!(%url, status = response.status, bytes = response.body.len(), "fetched");
                    return Ok(response);
                }
                Attempt::Failed(error) => return Err(error),
                Attempt::Retry { reason, wait } => {
                    attempt += 1;
                    warn!(
                        %url,
                        attempt,
                        max_retries = self.config.max_retries,
                        wait_ms = wait.as_millis() as u64,
                        "{reason}, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &str, query: &QueryParams, attempt: u32) -> Attempt {
        let last = attempt >= self.config.max_retries;
        let backoff = self.config.backoff_delay(attempt);

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        match request.send().await {
            Ok(response) => read_response(response, last, backoff).await,
            Err(e) if e.is_timeout() => {
                let timeout_ms = self.config.timeout.as_millis() as u64;
                if last {
                    Attempt::Failed(Error::Timeout { timeout_ms })
                } else {
                    Attempt::Retry {
                        reason: format!("timed out after {timeout_ms}ms"),
                        wait: backoff,
                    }
                }
            }
            Err(e) if e.is_connect() && !last => Attempt::Retry {
                reason: format!("connection failed: {e}"),
                wait: backoff,
            },
            Err(e) => Attempt::Failed(Error::Http(e)),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// 429 and transient 5xx are retried unless this was the last attempt
async fn read_response(response: Response, last: bool, backoff: Duration) -> Attempt {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = retry_after(&response).unwrap_or(backoff);
        return if last {
            Attempt::Failed(Error::RateLimited {
                retry_after_seconds: wait.as_secs(),
            })
        } else {
            Attempt::Retry {
                reason: "rate limited (429)".to_string(),
                wait,
            }
        };
    }

    if is_transient(status) && !last {
        return Attempt::Retry {
            reason: format!("server answered {}", status.as_u16()),
            wait: backoff,
        };
    }

    match response.text().await {
        Ok(body) => Attempt::Done(TextResponse {
            status: status.as_u16(),
            body,
        }),
        Err(e) => Attempt::Failed(Error::Http(e)),
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}

/// `Retry-After` given in seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
}
