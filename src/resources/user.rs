//! User resource
//!
//! Desired-state records are validated against [`user_schema`], turned into
//! a [`UserConfig`], and mapped onto management API payloads. Remote users
//! are reflected back into [`UserState`] with both metadata surfaces filled.

use super::{bool_attr, string_attr};
use crate::error::{Error, Result};
use crate::management::{ManagementApi, User};
use crate::metadata::{MetadataField, MetadataInput, MetadataReconciler, ReflectedMetadata};
use crate::schema::{Attribute, JsonType, ResourceSchema};
use crate::types::{JsonObject, JsonValue, Metadata};
use tracing::{debug, info, warn};

/// Resource type name
pub const USER_RESOURCE: &str = "user";

/// Prefix the platform puts in front of database-connection user ids
pub const DATABASE_ID_PREFIX: &str = "auth0|";

const USER_METADATA: &str = "user_metadata";
const APP_METADATA: &str = "app_metadata";

/// Attribute schema for the user resource
pub fn user_schema() -> ResourceSchema {
    ResourceSchema::new(USER_RESOURCE)
        .with_attribute(
            "user_id",
            Attribute::optional_string()
                .and_computed()
                .with_description("Custom id on create; the stored id afterwards"),
        )
        .with_attribute("connection_name", Attribute::required_string())
        .with_attribute("email", Attribute::optional_string())
        .with_attribute("username", Attribute::optional_string())
        .with_attribute("password", Attribute::optional_string().sensitive())
        .with_attribute("phone_number", Attribute::optional_string())
        .with_attribute("email_verified", Attribute::optional_bool())
        .with_attribute("verify_email", Attribute::optional_bool())
        .with_attribute("phone_verified", Attribute::optional_bool())
        .with_metadata_pair(&MetadataField::new(USER_METADATA))
        .with_metadata_pair(&MetadataField::new(APP_METADATA))
        .with_attribute("created_at", Attribute::computed(JsonType::String))
        .with_attribute("updated_at", Attribute::computed(JsonType::String))
}

/// Desired state for one user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserConfig {
    pub user_id: Option<String>,
    pub connection_name: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: Option<bool>,
    pub verify_email: Option<bool>,
    pub phone_verified: Option<bool>,
    pub user_metadata: MetadataInput,
    pub app_metadata: MetadataInput,
}

impl UserConfig {
    /// Validate a desired-state record and read it into a config
    pub fn from_record(record: &JsonObject) -> Result<Self> {
        user_schema().check(record)?;

        Ok(Self {
            user_id: string_attr(record, "user_id"),
            connection_name: string_attr(record, "connection_name").ok_or_else(|| {
                Error::validation("connection_name", "required attribute is missing")
            })?,
            email: string_attr(record, "email"),
            username: string_attr(record, "username"),
            password: string_attr(record, "password"),
            phone_number: string_attr(record, "phone_number"),
            email_verified: bool_attr(record, "email_verified"),
            verify_email: bool_attr(record, "verify_email"),
            phone_verified: bool_attr(record, "phone_verified"),
            user_metadata: MetadataInput::from_record(&MetadataField::new(USER_METADATA), record)?,
            app_metadata: MetadataInput::from_record(&MetadataField::new(APP_METADATA), record)?,
        })
    }
}

/// Reflected state for one user
#[derive(Debug, Clone, PartialEq)]
pub struct UserState {
    pub user_id: String,
    pub connection_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: Option<bool>,
    pub verify_email: Option<bool>,
    pub phone_verified: Option<bool>,
    pub user_metadata: ReflectedMetadata,
    pub app_metadata: ReflectedMetadata,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl UserState {
    /// Reflect a remote user.
    ///
    /// Remote reads do not echo the connection, so it is carried over from
    /// the caller.
    pub fn reflect(user: &User, connection_name: Option<&str>) -> Result<Self> {
        let user_id = user
            .user_id
            .clone()
            .ok_or_else(|| Error::malformed_response(USER_RESOURCE, "user has no user_id"))?;

        Ok(Self {
            user_id,
            connection_name: user
                .connection
                .clone()
                .or_else(|| connection_name.map(ToString::to_string)),
            email: user.email.clone(),
            username: user.username.clone(),
            phone_number: user.phone_number.clone(),
            email_verified: user.email_verified,
            verify_email: user.verify_email,
            phone_verified: user.phone_verified,
            user_metadata: reflect_metadata(USER_METADATA, user.user_metadata.as_ref())?,
            app_metadata: reflect_metadata(APP_METADATA, user.app_metadata.as_ref())?,
            created_at: user.created_at.map(|t| t.to_rfc3339()),
            updated_at: user.updated_at.map(|t| t.to_rfc3339()),
        })
    }

    /// Configuration-model record; sensitive attributes are never included
    pub fn to_record(&self) -> JsonObject {
        let mut record = JsonObject::new();
        record.insert("user_id".into(), JsonValue::String(self.user_id.clone()));
        insert_opt(&mut record, "connection_name", self.connection_name.clone());
        insert_opt(&mut record, "email", self.email.clone());
        insert_opt(&mut record, "username", self.username.clone());
        insert_opt(&mut record, "phone_number", self.phone_number.clone());
        insert_opt(&mut record, "email_verified", self.email_verified);
        insert_opt(&mut record, "verify_email", self.verify_email);
        insert_opt(&mut record, "phone_verified", self.phone_verified);
        insert_opt(&mut record, "created_at", self.created_at.clone());
        insert_opt(&mut record, "updated_at", self.updated_at.clone());
        self.user_metadata
            .write_into(&MetadataField::new(USER_METADATA), &mut record);
        self.app_metadata
            .write_into(&MetadataField::new(APP_METADATA), &mut record);
        user_schema().redact(&mut record);
        record
    }

    /// Read a previously stored state record.
    ///
    /// The raw metadata surfaces are recomputed from the structured ones.
    pub fn from_record(record: &JsonObject) -> Result<Self> {
        let user_id = string_attr(record, "user_id")
            .ok_or_else(|| Error::validation("user_id", "state record has no user_id"))?;

        let user_metadata = stored_metadata(record, USER_METADATA)?;
        let app_metadata = stored_metadata(record, APP_METADATA)?;

        Ok(Self {
            user_id,
            connection_name: string_attr(record, "connection_name"),
            email: string_attr(record, "email"),
            username: string_attr(record, "username"),
            phone_number: string_attr(record, "phone_number"),
            email_verified: bool_attr(record, "email_verified"),
            verify_email: bool_attr(record, "verify_email"),
            phone_verified: bool_attr(record, "phone_verified"),
            user_metadata: reflect_metadata(USER_METADATA, user_metadata.as_ref())?,
            app_metadata: reflect_metadata(APP_METADATA, app_metadata.as_ref())?,
            created_at: string_attr(record, "created_at"),
            updated_at: string_attr(record, "updated_at"),
        })
    }
}

fn reflect_metadata(name: &str, remote: Option<&Metadata>) -> Result<ReflectedMetadata> {
    let empty = Metadata::new();
    MetadataReconciler::for_field(name).reflect(remote.unwrap_or(&empty))
}

fn stored_metadata(record: &JsonObject, name: &str) -> Result<Option<Metadata>> {
    match record.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| Error::validation(name, format!("stored value is not a map: {e}"))),
    }
}

fn insert_opt<T: Into<JsonValue>>(record: &mut JsonObject, key: &str, value: Option<T>) {
    if let Some(value) = value {
        record.insert(key.to_string(), value.into());
    }
}

/// Whether a stored id and a desired id name the same user
pub fn user_id_matches(stored: &str, desired: &str) -> bool {
    stored == desired || stored.strip_prefix(DATABASE_ID_PREFIX) == Some(desired)
}

/// Value to send: the desired one, unless it already matches prior state
fn changed<T: PartialEq + Clone>(desired: &Option<T>, current: Option<&Option<T>>) -> Option<T> {
    match (desired, current) {
        (None, _) => None,
        (Some(d), Some(Some(c))) if d == c => None,
        (Some(d), _) => Some(d.clone()),
    }
}

/// Build the management API payload.
///
/// With no `prior` state this is a create payload carrying every set
/// attribute. With prior state only changed attributes are sent. Metadata is
/// resolved first so a malformed value aborts before any request.
pub fn build_user(config: &UserConfig, prior: Option<&UserState>) -> Result<User> {
    let user_metadata =
        MetadataReconciler::for_field(USER_METADATA).resolve(&config.user_metadata)?;
    let app_metadata = MetadataReconciler::for_field(APP_METADATA).resolve(&config.app_metadata)?;

    let mut user = User {
        email: changed(&config.email, prior.map(|p| &p.email)),
        username: changed(&config.username, prior.map(|p| &p.username)),
        // Write-only, so always sent when set
        password: config.password.clone(),
        phone_number: changed(&config.phone_number, prior.map(|p| &p.phone_number)),
        email_verified: changed(&config.email_verified, prior.map(|p| &p.email_verified)),
        verify_email: changed(&config.verify_email, prior.map(|p| &p.verify_email)),
        phone_verified: changed(&config.phone_verified, prior.map(|p| &p.phone_verified)),
        user_metadata,
        app_metadata,
        ..User::default()
    };

    match prior {
        None => {
            user.user_id = config.user_id.clone();
            user.connection = Some(config.connection_name.clone());
        }
        Some(_) if user.needs_connection() => {
            user.connection = Some(config.connection_name.clone());
        }
        Some(_) => {}
    }

    Ok(user)
}

/// Attributes whose desired value differs from state.
///
/// Unset desired attributes are not compared, the write-only password never
/// drifts, and metadata is compared by resolved value so either surface can
/// be used without spurious differences.
pub fn plan(config: &UserConfig, state: &UserState) -> Result<Vec<String>> {
    let mut drift = Vec::new();
    let mut check = |name: &str, differs: bool| {
        if differs {
            drift.push(name.to_string());
        }
    };

    check(
        "user_id",
        config
            .user_id
            .as_deref()
            .is_some_and(|id| !user_id_matches(&state.user_id, id)),
    );
    check(
        "connection_name",
        state
            .connection_name
            .as_deref()
            .is_some_and(|c| c != config.connection_name),
    );
    check("email", differs(&config.email, &state.email));
    check("username", differs(&config.username, &state.username));
    check("phone_number", differs(&config.phone_number, &state.phone_number));
    check("email_verified", differs(&config.email_verified, &state.email_verified));
    check("verify_email", differs(&config.verify_email, &state.verify_email));
    check("phone_verified", differs(&config.phone_verified, &state.phone_verified));

    let user_metadata =
        MetadataReconciler::for_field(USER_METADATA).resolve(&config.user_metadata)?;
    check(
        USER_METADATA,
        user_metadata.is_some_and(|m| m != state.user_metadata.structured),
    );
    let app_metadata = MetadataReconciler::for_field(APP_METADATA).resolve(&config.app_metadata)?;
    check(
        APP_METADATA,
        app_metadata.is_some_and(|m| m != state.app_metadata.structured),
    );

    Ok(drift)
}

fn differs<T: PartialEq>(desired: &Option<T>, current: &Option<T>) -> bool {
    desired.as_ref().is_some_and(|d| Some(d) != current.as_ref())
}

// ============================================================================
// CRUD
// ============================================================================

/// Create a user and reflect the stored record
pub async fn create<A>(api: &A, config: &UserConfig) -> Result<UserState>
where
    A: ManagementApi + ?Sized,
{
    let payload = build_user(config, None)?;
    let created = api.create_user(&payload).await?;
    let state = UserState::reflect(&created, Some(&config.connection_name))?;
    info!(user_id = %state.user_id, "User created");
    Ok(state)
}

/// Read a user; `None` when it no longer exists remotely
pub async fn read<A>(
    api: &A,
    user_id: &str,
    connection_name: Option<&str>,
) -> Result<Option<UserState>>
where
    A: ManagementApi + ?Sized,
{
    match api.read_user(user_id).await {
        Ok(user) => UserState::reflect(&user, connection_name).map(Some),
        Err(Error::NotFound { .. }) => {
            warn!(user_id, "User not found, dropping from state");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Update a user from desired state, then re-read it
pub async fn update<A>(api: &A, config: &UserConfig, prior: &UserState) -> Result<UserState>
where
    A: ManagementApi + ?Sized,
{
    let payload = build_user(config, Some(prior))?;
    if payload == User::default() {
        debug!(user_id = %prior.user_id, "No changes to send");
    } else {
        api.update_user(&prior.user_id, &payload).await?;
    }

    read(api, &prior.user_id, Some(&config.connection_name))
        .await?
        .ok_or_else(|| Error::not_found(USER_RESOURCE, &prior.user_id))
}

/// Delete a user; a user that is already gone counts as deleted
pub async fn delete<A>(api: &A, user_id: &str) -> Result<()>
where
    A: ManagementApi + ?Sized,
{
    match api.delete_user(user_id).await {
        Ok(()) | Err(Error::NotFound { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
