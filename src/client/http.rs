//! ureq-backed transport

use super::{HttpResponse, Transport};
use crate::error::{HydraError, HydraResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// Connection settings for [`UreqTransport`]
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Whole-request timeout
    pub timeout: Duration,

    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("hydra-inputs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Blocking ureq agent driven from the tokio blocking pool
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(options: HttpOptions) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(options.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            user_agent: options.user_agent,
        }
    }

    fn get_blocking(&self, url: &str) -> HydraResult<HttpResponse> {
        let transport_err = |e: ureq::Error| HydraError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let mut response = self
            .agent
            .get(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(transport_err)?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(transport_err)?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(HttpOptions::default())
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn get(&self, url: &str) -> HydraResult<HttpResponse> {
        let this = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || this.get_blocking(&url))
            .await
            .map_err(|e| HydraError::Internal(format!("HTTP worker failed: {e}")))?
    }

    fn transport_name(&self) -> &'static str {
        "ureq"
    }
}
