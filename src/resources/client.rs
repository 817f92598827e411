//! Client data source
//!
//! Looks up an application client by `client_id` and reflects it, including
//! both surfaces of `client_metadata`.

use super::string_attr;
use crate::error::{Error, Result};
use crate::management::{Client, ManagementApi};
use crate::metadata::{MetadataField, MetadataReconciler, ReflectedMetadata};
use crate::schema::{Attribute, JsonType, ResourceSchema};
use crate::types::{JsonObject, JsonValue, Metadata};

/// Data source type name
pub const CLIENT_DATA_SOURCE: &str = "client";

const CLIENT_METADATA: &str = "client_metadata";

/// Attribute schema for the client data source
pub fn client_schema() -> ResourceSchema {
    let metadata = MetadataField::new(CLIENT_METADATA);
    ResourceSchema::new(CLIENT_DATA_SOURCE)
        .with_attribute("client_id", Attribute::required_string())
        .with_attribute("name", Attribute::computed(JsonType::String))
        .with_attribute("description", Attribute::computed(JsonType::String))
        .with_attribute("app_type", Attribute::computed(JsonType::String))
        .with_attribute("is_first_party", Attribute::computed(JsonType::Boolean))
        .with_attribute("callbacks", Attribute::computed(JsonType::List))
        .with_attribute("allowed_origins", Attribute::computed(JsonType::List))
        .with_attribute(metadata.name(), Attribute::computed(JsonType::Map))
        .with_attribute(metadata.raw_name(), Attribute::computed(JsonType::String))
}

/// Reflected state of a client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientState {
    pub client_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub app_type: Option<String>,
    pub is_first_party: Option<bool>,
    pub callbacks: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub client_metadata: ReflectedMetadata,
}

impl ClientState {
    /// Reflect a remote client
    pub fn reflect(client: &Client) -> Result<Self> {
        let empty = Metadata::new();
        let client_metadata = MetadataReconciler::for_field(CLIENT_METADATA)
            .reflect(client.client_metadata.as_ref().unwrap_or(&empty))?;

        Ok(Self {
            client_id: client.client_id.clone(),
            name: client.name.clone(),
            description: client.description.clone(),
            app_type: client.app_type.clone(),
            is_first_party: client.is_first_party,
            callbacks: client.callbacks.clone(),
            allowed_origins: client.allowed_origins.clone(),
            client_metadata,
        })
    }

    /// Configuration-model record
    pub fn to_record(&self) -> JsonObject {
        let mut record = JsonObject::new();
        record.insert("client_id".into(), self.client_id.clone().into());
        for (key, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("app_type", &self.app_type),
        ] {
            if let Some(value) = value {
                record.insert(key.into(), value.clone().into());
            }
        }
        if let Some(first_party) = self.is_first_party {
            record.insert("is_first_party".into(), first_party.into());
        }
        record.insert("callbacks".into(), self.callbacks.clone().into());
        record.insert("allowed_origins".into(), self.allowed_origins.clone().into());
        self.client_metadata
            .write_into(&MetadataField::new(CLIENT_METADATA), &mut record);
        record
    }
}

/// Read the client named by the data source arguments
pub async fn read_client<A>(api: &A, args: &JsonObject) -> Result<ClientState>
where
    A: ManagementApi + ?Sized,
{
    client_schema().check(args)?;
    let client_id = string_attr(args, "client_id")
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::validation("client_id", "must not be empty"))?;

    let client = api.read_client(&client_id).await?;
    ClientState::reflect(&client)
}

/// Convenience wrapper taking the client id directly
pub async fn read_client_by_id<A>(api: &A, client_id: &str) -> Result<ClientState>
where
    A: ManagementApi + ?Sized,
{
    let mut args = JsonObject::new();
    args.insert("client_id".into(), JsonValue::String(client_id.to_string()));
    read_client(api, &args).await
}
