//! HTTP client module
//!
//! Text GETs against the ISS root with retries, backoff and a token bucket
//! rate limiter.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, TextResponse, DEFAULT_USER_AGENT};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
