//! HTTP client module
//!
//! Transport for the management API: bearer token, retry with backoff,
//! and token bucket rate limiting via governor.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
