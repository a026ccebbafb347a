//! Raw input descriptors and their resolved values

use crate::error::{HydraError, HydraResult};
use crate::graph::{BuildId, EvalId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An input descriptor exactly as `eval/{id}` reports it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<Value>,
}

/// The closed set of input type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    String,
    Boolean,
    Path,
    Git,
    /// Output of another build; resolved recursively
    Build,
}

impl InputKind {
    /// Parse a type tag, `None` for anything unrecognised
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "path" => Some(Self::Path),
            "git" => Some(Self::Git),
            "build" => Some(Self::Build),
            _ => None,
        }
    }
}

/// The effective value of one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "is")]
pub enum InputValue {
    #[serde(rename = "str")]
    String { value: String },

    #[serde(rename = "bool")]
    Boolean { value: bool },

    #[serde(rename = "path")]
    Path { value: String },

    #[serde(rename = "git")]
    Git { uri: String, rev: String },
}

impl InputValue {
    /// Short tag shown in the `is` attribute
    pub fn tag(&self) -> &'static str {
        match self {
            Self::String { .. } => "str",
            Self::Boolean { .. } => "bool",
            Self::Path { .. } => "path",
            Self::Git { .. } => "git",
        }
    }

    /// Attribute/value pairs, `is` first
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("is", self.tag().to_string())];
        match self {
            Self::String { value } | Self::Path { value } => attrs.push(("value", value.clone())),
            Self::Boolean { value } => attrs.push(("value", value.to_string())),
            Self::Git { uri, rev } => {
                attrs.push(("uri", uri.clone()));
                attrs.push(("rev", rev.clone()));
            }
        }
        attrs
    }
}

/// Where a raw descriptor came from, for error messages
pub(crate) struct InputSite<'a> {
    pub eval: EvalId,
    pub name: &'a str,
}

impl InputSite<'_> {
    fn entity(&self) -> String {
        format!("Input '{}' of evaluation {}", self.name, self.eval)
    }

    fn unknown_type(&self, raw: &RawInput) -> HydraError {
        HydraError::UnknownInputType {
            eval: self.eval,
            input: self.name.to_string(),
            raw: serde_json::to_string(raw).unwrap_or_else(|_| format!("{raw:?}")),
        }
    }
}

impl RawInput {
    /// Classify the descriptor by its type tag
    pub(crate) fn kind(&self, site: &InputSite<'_>) -> HydraResult<InputKind> {
        self.kind
            .as_deref()
            .and_then(InputKind::from_tag)
            .ok_or_else(|| site.unknown_type(self))
    }

    /// Convert a non-build descriptor into its value
    pub(crate) fn to_leaf_value(&self, kind: InputKind, site: &InputSite<'_>) -> HydraResult<InputValue> {
        match kind {
            InputKind::String => Ok(InputValue::String {
                value: self.scalar_value(site)?,
            }),
            InputKind::Path => Ok(InputValue::Path {
                value: self.scalar_value(site)?,
            }),
            InputKind::Boolean => Ok(InputValue::Boolean {
                value: self.bool_value(site)?,
            }),
            InputKind::Git => Ok(InputValue::Git {
                uri: self
                    .uri
                    .clone()
                    .ok_or_else(|| HydraError::missing(site.entity(), "uri"))?,
                rev: self
                    .revision
                    .clone()
                    .ok_or_else(|| HydraError::missing(site.entity(), "revision"))?,
            }),
            InputKind::Build => Err(HydraError::Internal(format!(
                "{} is build-typed and has no leaf value",
                site.entity()
            ))),
        }
    }

    /// Id of the build a build-typed input points at
    pub(crate) fn dependency(&self, site: &InputSite<'_>) -> HydraResult<BuildId> {
        let malformed = || HydraError::missing(site.entity(), "dependency");
        match self.dependency.as_ref().ok_or_else(malformed)? {
            Value::Number(n) => n.as_u64().map(BuildId).ok_or_else(malformed),
            Value::String(s) => s.parse().map_err(|_| malformed()),
            _ => Err(malformed()),
        }
    }

    fn scalar_value(&self, site: &InputSite<'_>) -> HydraResult<String> {
        match self.value.as_ref() {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
            _ => Err(HydraError::missing(site.entity(), "value")),
        }
    }

    fn bool_value(&self, site: &InputSite<'_>) -> HydraResult<bool> {
        match self.value.as_ref() {
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(HydraError::missing(site.entity(), "value")),
            },
            _ => Err(HydraError::missing(site.entity(), "value")),
        }
    }
}
