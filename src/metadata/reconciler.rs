//! Metadata reconciler implementation
//!
//! Resolution turns a desired-state surface into the canonical map sent on
//! create/update. Reflection turns a remote map into both surfaces with a
//! byte-stable raw encoding, so unchanged remote data never shows up as drift.

use super::types::{json_kind, MetadataField, MetadataInput, ReflectedMetadata};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Metadata};
use tracing::debug;

/// Reconciles the structured and raw surfaces of one metadata field
#[derive(Debug, Clone)]
pub struct MetadataReconciler {
    field: MetadataField,
}

impl MetadataReconciler {
    /// Create a reconciler for the given field
    pub fn new(field: MetadataField) -> Self {
        Self { field }
    }

    /// Create a reconciler from the structured attribute name
    pub fn for_field(name: &str) -> Self {
        Self::new(MetadataField::new(name))
    }

    /// The field handled by this reconciler
    pub fn field(&self) -> &MetadataField {
        &self.field
    }

    /// Produce the value to send to the management API.
    ///
    /// `None` means the attribute is omitted from the request. A raw string
    /// that fails to parse as a JSON object yields `MalformedMetadata` and no
    /// request must be made.
    pub fn resolve(&self, input: &MetadataInput) -> Result<Option<Metadata>> {
        match input {
            MetadataInput::Structured(map) => Ok(Some(map.clone())),
            MetadataInput::Raw(raw) => {
                let map: Metadata = serde_json::from_str(raw)
                    .map_err(|e| Error::malformed(self.field.raw_name(), e))?;
                debug!(
                    field = %self.field,
                    keys = map.len(),
                    "Resolved metadata from raw JSON"
                );
                Ok(Some(map))
            }
            MetadataInput::Absent => Ok(None),
        }
    }

    /// Read the pair out of `record` and resolve it in one step
    pub fn resolve_record(&self, record: &JsonObject) -> Result<Option<Metadata>> {
        let input = MetadataInput::from_record(&self.field, record)?;
        self.resolve(&input)
    }

    /// Produce both surfaces from a remote map
    pub fn reflect(&self, remote: &Metadata) -> Result<ReflectedMetadata> {
        let raw = canonical_json(remote)
            .map_err(|e| Error::serialization(self.field.raw_name(), e.to_string()))?;
        Ok(ReflectedMetadata {
            structured: remote.clone(),
            raw,
        })
    }

    /// Validate a candidate value for this field's raw attribute
    pub fn validate_raw(&self, value: &JsonValue) -> Result<()> {
        validate_raw_field(&self.field.raw_name(), value)
    }
}

/// Check that a raw metadata attribute holds a string encoding a JSON object
pub fn validate_raw_field(field: &str, value: &JsonValue) -> Result<()> {
    let JsonValue::String(raw) = value else {
        return Err(Error::validation(
            field,
            format!("must be a string, got {}", json_kind(value)),
        ));
    };

    serde_json::from_str::<Metadata>(raw).map_err(|e| {
        Error::validation(field, format!("not a valid JSON object: {e}"))
    })?;

    Ok(())
}

/// Encode a metadata map with keys sorted at every nesting level
pub fn canonical_json(metadata: &Metadata) -> serde_json::Result<String> {
    let sorted: JsonObject = metadata
        .iter()
        .map(|(k, v)| (k.clone(), canonicalize(v)))
        .collect();
    serde_json::to_string(&JsonValue::Object(sorted))
}

fn canonicalize(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            JsonValue::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
