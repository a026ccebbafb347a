//! Scripted in-memory transport for unit tests

use super::{HttpResponse, Transport};
use crate::error::{HydraError, HydraResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned responses keyed by request path (without the base URL)
/// and records every request it receives.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: HashMap<String, HttpResponse>,
    log: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_json(self, path: &str, body: Value) -> Self {
        self.with_status(path, 200, &body.to_string())
    }

    pub(crate) fn with_status(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Paths requested so far, in order
    pub(crate) fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// How many times `path` was requested
    pub(crate) fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| *p == path).count()
    }
}

fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme
        .split_once('/')
        .map_or("", |(_, path)| path)
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> HydraResult<HttpResponse> {
        let path = path_of(url).to_string();
        self.log.lock().unwrap().push(path.clone());
        self.routes
            .get(&path)
            .cloned()
            .ok_or_else(|| HydraError::Transport {
                url: url.to_string(),
                reason: "no scripted response".to_string(),
            })
    }

    fn transport_name(&self) -> &'static str {
        "fake"
    }
}
