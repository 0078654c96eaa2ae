use crate::domain::model::SchemaMode;
use crate::utils::error::{ConnectorError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_ARCHIVE_NAME: &str = "connector_output.zip";

/// How nested objects become columns in heuristic mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedData {
    /// `{"a": {"b": 1}}` becomes the column `a.b`.
    #[default]
    Inline,
    /// `{"a": {"b": 1}}` becomes the column `a` holding `{"b":1}` as text.
    Object,
}

impl FromStr for NestedData {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "object" | "json" => Ok(Self::Object),
            other => Err(ConnectorError::InvalidConfigValueError {
                field: "nested_data".to_string(),
                value: other.to_string(),
                reason: "expected 'inline' or 'object'".to_string(),
            }),
        }
    }
}

/// What a field id that matches nothing in a record projects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    #[default]
    Null,
    /// Legacy behavior: the deepest node reached, serialized if it is a
    /// container.
    Container,
}

/// Per-request connector settings, passed explicitly to every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorOptions {
    #[serde(default)]
    pub schema_mode: SchemaMode,
    #[serde(default)]
    pub nested_data: NestedData,
    #[serde(default)]
    pub missing_fields: MissingFieldPolicy,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            schema_mode: SchemaMode::Heuristic,
            nested_data: NestedData::Inline,
            missing_fields: MissingFieldPolicy::Null,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConnectorOptions {
    pub fn heuristic() -> Self {
        Self::default()
    }

    pub fn annotated() -> Self {
        Self {
            schema_mode: SchemaMode::Annotated,
            ..Self::default()
        }
    }

    pub fn with_nested_data(mut self, nested_data: NestedData) -> Self {
        self.nested_data = nested_data;
        self
    }

    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_inline(&self) -> bool {
        self.nested_data == NestedData::Inline
    }
}
