//! Error types for hydra-inputs
//!
//! All modules use `HydraResult<T>` as their return type. Nothing is
//! recovered locally: any error aborts the whole resolution.

use crate::graph::{BuildId, EvalId};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hydra-inputs operations
pub type HydraResult<T> = Result<T, HydraError>;

/// All errors that can occur while resolving an evaluation
#[derive(Error, Debug)]
pub enum HydraError {
    // Fetch errors
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Server returned HTTP {status} for {url}: {body}")]
    Upstream {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Response from {url} is not valid JSON")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    // Record shape errors
    #[error("{entity} has no '{field}' in its server record")]
    MissingData { entity: String, field: String },

    #[error("{entity} record is malformed")]
    Malformed {
        entity: String,
        #[source]
        source: serde_json::Error,
    },

    // Resolution errors
    #[error("Evaluation {0} declares no inputs")]
    NoInputs(EvalId),

    #[error("Evaluation {0} has no builds to obtain inputs for")]
    NoBuilds(EvalId),

    #[error("Input '{input}' of evaluation {eval} has an unknown type: {raw}")]
    UnknownInputType {
        eval: EvalId,
        input: String,
        raw: String,
    },

    #[error("Input '{input}' of jobset {jobset} has {} alternatives: {}", .alts.len(), .alts.join(", "))]
    UnsupportedInputAlt {
        jobset: String,
        input: String,
        alts: Vec<String>,
    },

    #[error("Dependency chain exceeds {limit} evaluations at evaluation {eval}")]
    RecursionLimit { eval: EvalId, limit: usize },

    #[error("Dependency cycle through evaluation {eval}: {}", format_path(.path))]
    DependencyCycle { eval: EvalId, path: Vec<EvalId> },

    #[error("Input '{input}' of evaluation {eval} (build {build}): {source}")]
    Input {
        eval: EvalId,
        input: String,
        build: BuildId,
        #[source]
        source: Box<HydraError>,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_path(path: &[EvalId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl HydraError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a missing-field error for a named entity
    pub fn missing(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingData {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// The innermost error, looking through build-input wrappers
    pub fn root_cause(&self) -> &HydraError {
        match self {
            Self::Input { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self.root_cause() {
            Self::Transport { .. } => Some("Check the server URL and network connectivity"),
            Self::Upstream { status: 404, .. } => {
                Some("Check that the evaluation id exists on this server")
            }
            Self::Upstream { status, .. } if *status >= 500 => {
                Some("The server failed; retry later")
            }
            Self::Decode { .. } => Some("Is the URL pointing at a Hydra server root?"),
            Self::RecursionLimit { .. } => Some("Raise resolve.max_depth or pass --max-depth"),
            Self::ConfigInvalid { .. } => Some("Fix or remove the configuration file"),
            _ => None,
        }
    }
}
