//! Memoizing JSON fetcher
//!
//! Every distinct request path is sent to the transport at most once per
//! fetcher, even when several tasks ask for it at the same time. Entries
//! are never evicted: a fetcher lives for one resolution session.

use super::Transport;
use crate::error::{HydraError, HydraResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Longest upstream body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Ordered path segments identifying one API resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(Vec<String>);

impl RequestKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

type Slot = Arc<OnceCell<Arc<Value>>>;

/// Session-scoped cache in front of a [`Transport`]
pub struct CachedFetcher {
    base_url: String,
    transport: Arc<dyn Transport>,
    cache: Mutex<HashMap<RequestKey, Slot>>,
    requests: AtomicUsize,
}

impl CachedFetcher {
    /// Create a fetcher for the server rooted at `base_url`
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        let base_url = base_url.strip_suffix('/').unwrap_or(base_url).to_string();
        debug!("Fetching from {} via {}", base_url, transport.transport_name());
        Self {
            base_url,
            transport,
            cache: Mutex::new(HashMap::new()),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of requests actually sent to the transport
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// Full URL for a request key
    pub fn url_for(&self, key: &RequestKey) -> String {
        let mut url = self.base_url.clone();
        for part in key.parts() {
            url.push('/');
            url.push_str(part);
        }
        url
    }

    /// Fetch and decode the resource at `parts`, or return the cached copy
    pub async fn get<I, S>(&self, parts: I) -> HydraResult<Arc<Value>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = RequestKey::new(parts);

        // Lock only long enough to find or insert the slot
        let slot = {
            let mut cache = self.cache.lock().await;
            cache.entry(key.clone()).or_default().clone()
        };

        if let Some(value) = slot.get() {
            debug!("Cache hit for {}", key);
            return Ok(value.clone());
        }

        slot.get_or_try_init(|| self.fetch(&key)).await.cloned()
    }

    async fn fetch(&self, key: &RequestKey) -> HydraResult<Arc<Value>> {
        let url = self.url_for(key);
        self.requests.fetch_add(1, Ordering::Relaxed);
        debug!("GET {}", url);

        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            return Err(HydraError::Upstream {
                url,
                status: response.status,
                body: truncate(&response.body, MAX_ERROR_BODY),
            });
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|source| HydraError::Decode { url, source })?;
        Ok(Arc::new(value))
    }
}

fn truncate(body: &str, max: usize) -> String {
    let body = body.trim();
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
