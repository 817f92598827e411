//! Wire models for the management API
//!
//! Absent fields are skipped on serialization so an update payload only
//! touches what it carries.

use crate::types::Metadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A user as sent to and returned by the management API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Connection name; required on create and on some updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Write-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_email: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_verified: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<Metadata>,

    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the payload carries an attribute that the API only accepts
    /// together with the connection name
    pub fn needs_connection(&self) -> bool {
        self.username.is_some()
            || self.password.is_some()
            || self.email_verified.is_some()
            || self.phone_verified.is_some()
    }
}

/// An application client as returned by the management API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub app_type: Option<String>,

    #[serde(default)]
    pub is_first_party: Option<bool>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub callbacks: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub client_metadata: Option<Metadata>,
}

/// List fields the API may send as `null`
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
