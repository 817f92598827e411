//! Schema types

use crate::metadata::MetadataField;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Boolean,
    /// String-keyed map of arbitrary values
    Map,
    /// List of strings
    List,
}

impl JsonType {
    /// Check whether a (non-null) value has this type
    pub fn matches(&self, value: &JsonValue) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Map => value.is_object(),
            JsonType::List => value
                .as_array()
                .is_some_and(|items| items.iter().all(JsonValue::is_string)),
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Map => write!(f, "map"),
            JsonType::List => write!(f, "list of strings"),
        }
    }
}

/// Declaration of one resource attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Must be set in desired state
    #[serde(default)]
    pub required: bool,

    /// May be set in desired state
    #[serde(default)]
    pub optional: bool,

    /// Filled in from the remote record
    #[serde(default)]
    pub computed: bool,

    /// Never echoed back into state
    #[serde(default)]
    pub sensitive: bool,

    /// Holds a JSON-encoded object
    #[serde(default)]
    pub raw_json: bool,

    /// Attributes that may not be set together with this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,

    /// Description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attribute {
    fn new(json_type: JsonType) -> Self {
        Self {
            json_type,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            raw_json: false,
            conflicts_with: Vec::new(),
            description: None,
        }
    }

    /// A required string
    pub fn required_string() -> Self {
        Self {
            required: true,
            ..Self::new(JsonType::String)
        }
    }

    /// An optional attribute of the given type
    pub fn optional(json_type: JsonType) -> Self {
        Self {
            optional: true,
            ..Self::new(json_type)
        }
    }

    /// An optional string
    pub fn optional_string() -> Self {
        Self::optional(JsonType::String)
    }

    /// An optional boolean
    pub fn optional_bool() -> Self {
        Self::optional(JsonType::Boolean)
    }

    /// An optional map
    pub fn optional_map() -> Self {
        Self::optional(JsonType::Map)
    }

    /// A read-only attribute of the given type
    pub fn computed(json_type: JsonType) -> Self {
        Self {
            computed: true,
            ..Self::new(json_type)
        }
    }

    /// An optional string holding a JSON object
    pub fn raw_json() -> Self {
        Self {
            raw_json: true,
            ..Self::optional(JsonType::String)
        }
    }

    /// Also fill from the remote record when unset
    #[must_use]
    pub fn and_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Mark as sensitive
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Declare a conflicting attribute
    #[must_use]
    pub fn conflicts_with(mut self, other: impl Into<String>) -> Self {
        self.conflicts_with.push(other.into());
        self
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether desired state may set this attribute
    pub fn is_settable(&self) -> bool {
        self.required || self.optional
    }
}

/// Attribute schema for one resource or data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Resource type name (e.g. "user")
    pub name: String,

    /// Attributes by name
    pub attributes: BTreeMap<String, Attribute>,
}

impl ResourceSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Add a structured/raw metadata pair that are mutually exclusive
    #[must_use]
    pub fn with_metadata_pair(self, field: &MetadataField) -> Self {
        let raw_name = field.raw_name();
        self.with_attribute(
            field.name(),
            Attribute::optional_map()
                .and_computed()
                .conflicts_with(&raw_name),
        )
        .with_attribute(
            raw_name,
            Attribute::raw_json()
                .and_computed()
                .conflicts_with(field.name()),
        )
    }

    /// Get an attribute by name
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Remove attributes marked sensitive from a record
    pub fn redact(&self, record: &mut JsonObject) {
        for (name, attribute) in &self.attributes {
            if attribute.sensitive {
                record.remove(name);
            }
        }
    }

    /// Names of attributes that must be set
    pub fn required_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
