//! Metadata surface types

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Metadata};
use serde::{Deserialize, Serialize};

/// Suffix of the raw JSON twin of a metadata attribute
pub const RAW_SUFFIX: &str = "_json";

/// A logical metadata attribute such as `app_metadata`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataField {
    name: String,
}

impl MetadataField {
    /// Create a field from its structured attribute name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name of the structured attribute
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the raw JSON attribute
    pub fn raw_name(&self) -> String {
        format!("{}{RAW_SUFFIX}", self.name)
    }
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// The surface a desired-state record uses for one metadata field
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetadataInput {
    /// Key/value map set directly
    Structured(Metadata),
    /// JSON-encoded object held in the `_json` attribute
    Raw(String),
    /// Neither attribute set
    #[default]
    Absent,
}

impl MetadataInput {
    /// Read the metadata pair for `field` out of a desired-state record.
    ///
    /// Null values and empty structured maps count as unset. Setting both
    /// surfaces is rejected here so the conflict never reaches resolution.
    pub fn from_record(field: &MetadataField, record: &JsonObject) -> Result<Self> {
        let raw_name = field.raw_name();

        let structured = match record.get(field.name()) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Object(map)) if map.is_empty() => None,
            Some(JsonValue::Object(map)) => Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Metadata>(),
            ),
            Some(other) => {
                return Err(Error::validation(
                    field.name(),
                    format!("must be a map, got {}", json_kind(other)),
                ))
            }
        };

        let raw = match record.get(&raw_name) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(Error::validation(
                    &raw_name,
                    format!("must be a string, got {}", json_kind(other)),
                ))
            }
        };

        match (structured, raw) {
            (Some(_), Some(_)) => Err(Error::validation(
                field.name(),
                format!("conflicts with '{raw_name}', set only one of them"),
            )),
            (Some(map), None) => Ok(Self::Structured(map)),
            (None, Some(raw)) => Ok(Self::Raw(raw)),
            (None, None) => Ok(Self::Absent),
        }
    }

    /// Whether neither surface is set
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Both surfaces of a metadata field as reflected from a remote record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedMetadata {
    /// Remote map, verbatim
    pub structured: Metadata,
    /// Canonical JSON encoding of the same map
    pub raw: String,
}

impl ReflectedMetadata {
    /// Write both surfaces into a configuration-model record
    pub fn write_into(&self, field: &MetadataField, record: &mut JsonObject) {
        let structured: JsonObject = self
            .structured
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        record.insert(field.name().to_string(), JsonValue::Object(structured));
        record.insert(field.raw_name(), JsonValue::String(self.raw.clone()));
    }
}

/// Short name of a JSON value's type for error messages
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
