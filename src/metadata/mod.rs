//! Metadata field reconciliation
//!
//! Free-form metadata attributes (`app_metadata`, `user_metadata`,
//! `client_metadata`) can be written in desired state either as a structured
//! map or as a raw JSON string in the `<name>_json` twin attribute.
//!
//! # Overview
//!
//! The metadata module provides:
//! - `MetadataInput` - Which surface the user populated (never both)
//! - `MetadataReconciler` - Resolves desired state into the single value sent
//!   to the management API, and reflects remote values back into both surfaces
//! - `validate_raw_field` - Plan-time check for raw JSON attributes
//!
//! Absent metadata is omitted from requests and leaves remote data untouched.
//! A raw `"{}"` resolves to an empty map and clears remote data.

mod reconciler;
mod types;

pub use reconciler::{canonical_json, validate_raw_field, MetadataReconciler};
pub use types::{MetadataField, MetadataInput, ReflectedMetadata, RAW_SUFFIX};
pub(crate) use types::json_kind;
