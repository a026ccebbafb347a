//! Read-only client for the Hydra JSON API
//!
//! Provides a trait for the HTTP round trip so the memoizing fetcher can
//! run over different backends (ureq in production, a scripted fake in
//! tests).

mod fetcher;
mod http;
#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{CachedFetcher, RequestKey};
pub use http::{HttpOptions, UreqTransport};

use crate::error::HydraResult;
use async_trait::async_trait;

/// Raw response of a single GET, before status checking or decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract HTTP transport
///
/// Implementations perform exactly one GET per call and report only
/// failures to complete the exchange as errors. Non-success statuses are
/// returned as ordinary responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url` asking for JSON
    async fn get(&self, url: &str) -> HydraResult<HttpResponse>;

    /// Human-readable transport name for logs
    fn transport_name(&self) -> &'static str;
}
