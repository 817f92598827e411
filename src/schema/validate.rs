//! Desired-state validation against a resource schema
//!
//! Runs at plan time. Every violation is collected so a user sees all
//! problems in one pass; nothing here talks to the remote API.

use super::types::ResourceSchema;
use crate::error::{Error, Result};
use crate::metadata::validate_raw_field;
use crate::types::{JsonObject, JsonValue};
use tracing::debug;

/// Whether a record value counts as set.
///
/// Null and empty maps are treated as unset.
pub fn is_set(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

impl ResourceSchema {
    /// Validate a desired-state record, returning every violation found
    pub fn validate(&self, record: &JsonObject) -> Vec<Error> {
        let mut errors = Vec::new();

        for key in record.keys() {
            if !self.attributes.contains_key(key) {
                errors.push(Error::validation(
                    key,
                    format!("unknown attribute for '{}'", self.name),
                ));
            }
        }

        for (name, attribute) in &self.attributes {
            let value = record.get(name);

            if !is_set(value) {
                if attribute.required {
                    errors.push(Error::validation(name, "required attribute is missing"));
                }
                continue;
            }
            let Some(value) = value else { continue };

            if !attribute.is_settable() {
                errors.push(Error::validation(
                    name,
                    "computed attribute cannot be set",
                ));
                continue;
            }

            if !attribute.json_type.matches(value) {
                errors.push(Error::validation(
                    name,
                    format!("expected {}", attribute.json_type),
                ));
                continue;
            }

            if attribute.raw_json {
                if let Err(e) = validate_raw_field(name, value) {
                    errors.push(e);
                }
            }

            for other in &attribute.conflicts_with {
                // Report each pair once
                let other_declares = self
                    .attributes
                    .get(other)
                    .is_some_and(|a| a.conflicts_with.contains(name));
                if other_declares && other < name {
                    continue;
                }
                if is_set(record.get(other)) {
                    errors.push(Error::validation(
                        name,
                        format!("conflicts with '{other}', set only one of them"),
                    ));
                }
            }
        }

        debug!(
            resource = %self.name,
            errors = errors.len(),
            "Validated desired state"
        );
        errors
    }

    /// Validate a record, folding all violations into one error
    pub fn check(&self, record: &JsonObject) -> Result<()> {
        Error::from_many(self.validate(record))
    }
}
