//! Wire shapes of the three API endpoints
//!
//! Only the fields the resolver depends on are modelled. Every field is
//! optional at this layer so that an absent field surfaces as
//! `MissingData` naming the field, while a field of the wrong JSON type
//! surfaces as `Malformed`.

use crate::error::{HydraError, HydraResult};
use crate::graph::{BuildId, EvalId};
use crate::resolve::RawInput;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `GET /eval/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct EvalRecord {
    pub builds: Option<Vec<BuildId>>,
    pub jobsetevalinputs: Option<BTreeMap<String, RawInput>>,
}

/// `GET /build/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct BuildRecord {
    pub project: Option<String>,
    pub jobset: Option<String>,
    /// Newest first
    pub jobsetevals: Option<Vec<EvalId>>,
    pub buildoutputs: Option<BTreeMap<String, BuildOutput>>,
}

/// `GET /jobset/{project}/{jobset}`
#[derive(Debug, Deserialize)]
pub(crate) struct JobsetRecord {
    pub jobsetinputs: Option<BTreeMap<String, JobsetInputRecord>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobsetInputRecord {
    /// Reference strings of the form `project:jobset:input`
    pub jobsetinputalts: Option<Vec<String>>,
}

/// One named output artifact of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutput {
    /// Store path of the artifact
    pub path: String,
}

/// Decode a cached JSON document into a record type
pub(crate) fn decode<T: DeserializeOwned>(entity: &str, value: &Value) -> HydraResult<T> {
    T::deserialize(value).map_err(|source| HydraError::Malformed {
        entity: entity.to_string(),
        source,
    })
}
