//! Identity platform resources
//!
//! Each resource maps desired-state records onto management API calls and
//! reflects remote records back. Operations take the management API handle
//! as an explicit parameter.
//!
//! # Resources
//!
//! - `user` - create/read/update/delete, with `user_metadata` and
//!   `app_metadata` pairs
//! - `client` (data source) - read by `client_id`, with a `client_metadata`
//!   pair

pub mod client;
pub mod user;

pub use client::{client_schema, read_client, read_client_by_id, ClientState};
pub use user::{build_user, plan, user_id_matches, user_schema, UserConfig, UserState};

use crate::types::{JsonObject, JsonValue};

/// String attribute, if set
pub(crate) fn string_attr(record: &JsonObject, name: &str) -> Option<String> {
    match record.get(name) {
        Some(JsonValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Boolean attribute, if set
pub(crate) fn bool_attr(record: &JsonObject, name: &str) -> Option<bool> {
    record.get(name).and_then(JsonValue::as_bool)
}

#[cfg(test)]
mod tests;
