//! Resolution context
//!
//! A `Session` owns the fetch cache and the registries that let separate
//! parts of one resolution share entity instances. Entities never point
//! back at each other; every accessor takes the session explicitly.

use super::{EvalId, Evaluation, Jobset, Project};
use crate::client::CachedFetcher;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default bound on the length of a dependency chain
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Knobs for one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Most evaluations allowed on one dependency path
    pub max_depth: usize,

    /// Fetch the build records of build-typed inputs concurrently
    pub prefetch: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            prefetch: true,
        }
    }
}

/// One resolution session against one server
pub struct Session {
    fetcher: CachedFetcher,
    options: ResolveOptions,
    evaluations: Mutex<HashMap<EvalId, Arc<Evaluation>>>,
    jobsets: Mutex<HashMap<(String, String), Arc<Jobset>>>,
}

impl Session {
    pub fn new(fetcher: CachedFetcher, options: ResolveOptions) -> Self {
        Self {
            fetcher,
            options,
            evaluations: Mutex::new(HashMap::new()),
            jobsets: Mutex::new(HashMap::new()),
        }
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// The shared evaluation instance for `id`
    pub async fn evaluation(&self, id: EvalId) -> Arc<Evaluation> {
        let mut evaluations = self.evaluations.lock().await;
        evaluations
            .entry(id)
            .or_insert_with(|| Arc::new(Evaluation::new(id)))
            .clone()
    }

    /// The shared jobset instance for `project:name`
    pub async fn jobset(&self, project: &Project, name: &str) -> Arc<Jobset> {
        let mut jobsets = self.jobsets.lock().await;
        jobsets
            .entry((project.name().to_string(), name.to_string()))
            .or_insert_with(|| Arc::new(Jobset::new(project.clone(), name)))
            .clone()
    }
}
