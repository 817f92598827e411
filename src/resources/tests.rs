//! Tests for the user resource and client data source

use super::user::{create, delete, read, update};
use super::*;
use crate::error::{Error, Result};
use crate::management::{Client, ManagementApi, User};
use crate::metadata::MetadataInput;
use crate::types::{JsonObject, Metadata};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

// ============================================================================
// In-memory management API
// ============================================================================

/// Stores users in memory, merging metadata on patch like the real API
/// replaces top-level keys
#[derive(Default)]
struct FakeApi {
    users: Mutex<HashMap<String, User>>,
    clients: Mutex<HashMap<String, Client>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl FakeApi {
    fn record_call(&self, op: &str, payload: serde_json::Value) {
        self.calls.lock().unwrap().push((op.to_string(), payload));
    }

    fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn insert_user(&self, user: User) {
        let id = user.user_id.clone().unwrap();
        self.users.lock().unwrap().insert(id, user);
    }
}

#[async_trait]
impl ManagementApi for FakeApi {
    async fn create_user(&self, user: &User) -> Result<User> {
        self.record_call("create", serde_json::to_value(user).unwrap());
        let mut stored = user.clone();
        let id = match &user.user_id {
            Some(id) => format!("auth0|{id}"),
            None => "auth0|generated".to_string(),
        };
        stored.user_id = Some(id);
        stored.password = None;
        stored.connection = None;
        self.insert_user(stored.clone());
        Ok(stored)
    }

    async fn read_user(&self, user_id: &str) -> Result<User> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::not_found("user", user_id))
    }

    async fn update_user(&self, user_id: &str, patch: &User) -> Result<User> {
        self.record_call("update", serde_json::to_value(patch).unwrap());
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| Error::not_found("user", user_id))?;
        if patch.email.is_some() {
            user.email.clone_from(&patch.email);
        }
        if patch.username.is_some() {
            user.username.clone_from(&patch.username);
        }
        if patch.email_verified.is_some() {
            user.email_verified = patch.email_verified;
        }
        if patch.app_metadata.is_some() {
            user.app_metadata.clone_from(&patch.app_metadata);
        }
        if patch.user_metadata.is_some() {
            user.user_metadata.clone_from(&patch.user_metadata);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.record_call("delete", json!(user_id));
        self.users
            .lock()
            .unwrap()
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("user", user_id))
    }

    async fn read_client(&self, client_id: &str) -> Result<Client> {
        self.clients
            .lock()
            .unwrap()
            .get(client_id)
            .cloned()
            .ok_or_else(|| Error::not_found("client", client_id))
    }
}

fn record(value: serde_json::Value) -> JsonObject {
    serde_json::from_value(value).unwrap()
}

fn metadata(value: serde_json::Value) -> Metadata {
    serde_json::from_value(value).unwrap()
}

fn config(value: serde_json::Value) -> UserConfig {
    UserConfig::from_record(&record(value)).unwrap()
}

// ============================================================================
// UserConfig
// ============================================================================

#[test]
fn test_user_config_from_record() {
    let config = config(json!({
        "connection_name": "db",
        "email": "a@example.com",
        "email_verified": true,
        "user_metadata": {"theme": "dark"},
        "app_metadata_json": "{\"role\":\"admin\"}"
    }));

    assert_eq!(config.connection_name, "db");
    assert_eq!(config.email.as_deref(), Some("a@example.com"));
    assert_eq!(config.email_verified, Some(true));
    assert_eq!(
        config.user_metadata,
        MetadataInput::Structured(metadata(json!({"theme": "dark"})))
    );
    assert_eq!(
        config.app_metadata,
        MetadataInput::Raw("{\"role\":\"admin\"}".to_string())
    );
}

#[test]
fn test_user_config_rejects_both_metadata_surfaces() {
    let err = UserConfig::from_record(&record(json!({
        "connection_name": "db",
        "app_metadata": {"role": "admin"},
        "app_metadata_json": "{\"role\":\"admin\"}"
    })))
    .unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "app_metadata"));
}

#[test]
fn test_user_config_reports_all_problems() {
    let err = UserConfig::from_record(&record(json!({
        "user_metadata_json": "[1]",
        "email_verified": "yes"
    })))
    .unwrap_err();
    match err {
        Error::Invalid { errors } => assert_eq!(errors.len(), 3),
        other => panic!("expected aggregated error, got {other:?}"),
    }
}

// ============================================================================
// Payload building
// ============================================================================

#[test]
fn test_build_create_payload() {
    let user = build_user(
        &config(json!({
            "connection_name": "db",
            "user_id": "12345",
            "email": "a@example.com",
            "password": "s3cret!",
            "app_metadata_json": "{\"role\":\"admin\"}"
        })),
        None,
    )
    .unwrap();

    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        json!({
            "user_id": "12345",
            "connection": "db",
            "email": "a@example.com",
            "password": "s3cret!",
            "app_metadata": {"role": "admin"}
        })
    );
}

#[test]
fn test_build_payload_malformed_metadata_fails() {
    let desired = UserConfig {
        connection_name: "db".to_string(),
        app_metadata: MetadataInput::Raw("{broken".to_string()),
        ..UserConfig::default()
    };
    let err = build_user(&desired, None).unwrap_err();
    assert!(matches!(err, Error::MalformedMetadata { ref field, .. } if field == "app_metadata_json"));
}

fn prior_state() -> UserState {
    UserState::reflect(
        &User {
            user_id: Some("auth0|1".to_string()),
            email: Some("a@example.com".to_string()),
            username: Some("alice".to_string()),
            email_verified: Some(false),
            ..User::default()
        },
        Some("db"),
    )
    .unwrap()
}

#[test]
fn test_build_update_payload_only_sends_changes() {
    let user = build_user(
        &config(json!({
            "connection_name": "db",
            "email": "new@example.com",
            "username": "alice"
        })),
        Some(&prior_state()),
    )
    .unwrap();

    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        json!({"email": "new@example.com"})
    );
}

#[test]
fn test_build_update_payload_adds_connection_when_required() {
    let user = build_user(
        &config(json!({
            "connection_name": "db",
            "username": "alice2",
            "email_verified": true
        })),
        Some(&prior_state()),
    )
    .unwrap();

    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        json!({
            "connection": "db",
            "username": "alice2",
            "email_verified": true
        })
    );
}

#[test]
fn test_build_update_payload_empty_raw_clears_metadata() {
    let user = build_user(
        &config(json!({"connection_name": "db", "app_metadata_json": "{}"})),
        Some(&prior_state()),
    )
    .unwrap();
    assert_eq!(user.app_metadata, Some(Metadata::new()));
    assert_eq!(user.user_metadata, None);
}

// ============================================================================
// State
// ============================================================================

#[test]
fn test_state_record_has_both_metadata_surfaces() {
    let state = UserState::reflect(
        &User {
            user_id: Some("auth0|1".to_string()),
            app_metadata: Some(metadata(json!({"role": "admin", "plan": "pro"}))),
            password: Some("leaked".to_string()),
            ..User::default()
        },
        Some("db"),
    )
    .unwrap();

    let record = state.to_record();
    assert_eq!(record["app_metadata"], json!({"plan": "pro", "role": "admin"}));
    assert_eq!(
        record["app_metadata_json"],
        json!("{\"plan\":\"pro\",\"role\":\"admin\"}")
    );
    assert_eq!(record["user_metadata"], json!({}));
    assert_eq!(record["user_metadata_json"], json!("{}"));
    assert_eq!(record["connection_name"], json!("db"));
    assert!(!record.contains_key("password"));
}

#[test]
fn test_user_schema_redacts_password() {
    let mut desired = record(json!({
        "connection_name": "db",
        "email": "a@example.com",
        "password": "s3cret!"
    }));
    user_schema().redact(&mut desired);
    assert_eq!(
        desired,
        record(json!({"connection_name": "db", "email": "a@example.com"}))
    );
}

#[test]
fn test_state_record_round_trip() {
    let state = UserState::reflect(
        &User {
            user_id: Some("auth0|1".to_string()),
            email: Some("a@example.com".to_string()),
            phone_verified: Some(true),
            user_metadata: Some(metadata(json!({"b": [2], "a": {"z": 1, "y": 0}}))),
            ..User::default()
        },
        Some("db"),
    )
    .unwrap();

    let restored = UserState::from_record(&state.to_record()).unwrap();
    assert_eq!(restored, state);
}

#[test]
fn test_remote_user_without_id_is_malformed_response() {
    let err = UserState::reflect(&User::default(), None).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { ref resource, .. } if resource == "user"));
    assert!(!err.is_user_error());
}

// ============================================================================
// Plan
// ============================================================================

#[test]
fn test_user_id_matches() {
    assert!(user_id_matches("abc", "abc"));
    assert!(user_id_matches("auth0|abc", "abc"));
    assert!(!user_id_matches("auth0|abc", "xyz"));
    assert!(!user_id_matches("abc", "auth0|abc"));
}

#[test]
fn test_plan_no_drift_for_prefixed_id() {
    let state = prior_state();
    let drift = plan(
        &config(json!({"connection_name": "db", "user_id": "1", "email": "a@example.com"})),
        &state,
    )
    .unwrap();
    assert!(drift.is_empty(), "unexpected drift: {drift:?}");
}

#[test]
fn test_plan_metadata_surfaces_are_equivalent() {
    let state = UserState::reflect(
        &User {
            user_id: Some("auth0|1".to_string()),
            app_metadata: Some(metadata(json!({"role": "admin", "plan": "pro"}))),
            ..User::default()
        },
        Some("db"),
    )
    .unwrap();

    let via_raw = config(json!({
        "connection_name": "db",
        "app_metadata_json": "{\"role\": \"admin\", \"plan\": \"pro\"}"
    }));
    let via_map = config(json!({
        "connection_name": "db",
        "app_metadata": {"plan": "pro", "role": "admin"}
    }));

    assert!(plan(&via_raw, &state).unwrap().is_empty());
    assert!(plan(&via_map, &state).unwrap().is_empty());
}

#[test]
fn test_plan_reports_changed_attributes() {
    let drift = plan(
        &config(json!({
            "connection_name": "db",
            "email": "other@example.com",
            "password": "ignored",
            "app_metadata_json": "{}"
        })),
        &prior_state(),
    )
    .unwrap();
    // prior app_metadata is already empty
    assert_eq!(drift, vec!["email"]);

    let drift = plan(
        &config(json!({
            "connection_name": "other-db",
            "email_verified": true,
            "user_metadata": {"k": "v"}
        })),
        &prior_state(),
    )
    .unwrap();
    assert_eq!(drift, vec!["connection_name", "email_verified", "user_metadata"]);
}

// ============================================================================
// CRUD against the in-memory API
// ============================================================================

#[tokio::test]
async fn test_create_reflects_remote_record() {
    let api = FakeApi::default();
    let state = create(
        &api,
        &config(json!({
            "connection_name": "db",
            "user_id": "abc",
            "email": "a@example.com",
            "app_metadata_json": "{\"role\":\"admin\"}"
        })),
    )
    .await
    .unwrap();

    assert_eq!(state.user_id, "auth0|abc");
    assert_eq!(state.connection_name.as_deref(), Some("db"));
    assert_eq!(state.app_metadata.raw, "{\"role\":\"admin\"}");
    assert_eq!(api.calls()[0].0, "create");
}

#[tokio::test]
async fn test_malformed_metadata_never_reaches_api() {
    let api = FakeApi::default();
    let desired = UserConfig {
        connection_name: "db".to_string(),
        user_metadata: MetadataInput::Raw("not json".to_string()),
        ..UserConfig::default()
    };

    assert!(create(&api, &desired).await.is_err());

    let prior = prior_state();
    api.insert_user(User {
        user_id: Some(prior.user_id.clone()),
        ..User::default()
    });
    assert!(update(&api, &desired, &prior).await.is_err());

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_update_sends_patch_and_rereads() {
    let api = FakeApi::default();
    let state = create(
        &api,
        &config(json!({
            "connection_name": "db",
            "email": "a@example.com",
            "app_metadata": {"role": "admin"}
        })),
    )
    .await
    .unwrap();

    let updated = update(
        &api,
        &config(json!({
            "connection_name": "db",
            "email": "a@example.com",
            "app_metadata_json": "{\"role\":\"admin\",\"plan\":\"pro\"}"
        })),
        &state,
    )
    .await
    .unwrap();

    assert_eq!(
        updated.app_metadata.structured,
        metadata(json!({"role": "admin", "plan": "pro"}))
    );
    assert_eq!(updated.app_metadata.raw, "{\"plan\":\"pro\",\"role\":\"admin\"}");

    let calls = api.calls();
    assert_eq!(calls[1].0, "update");
    assert_eq!(
        calls[1].1,
        json!({"app_metadata": {"plan": "pro", "role": "admin"}})
    );
}

#[tokio::test]
async fn test_update_without_changes_skips_request() {
    let api = FakeApi::default();
    let state = create(
        &api,
        &config(json!({"connection_name": "db", "email": "a@example.com"})),
    )
    .await
    .unwrap();

    update(
        &api,
        &config(json!({"connection_name": "db", "email": "a@example.com"})),
        &state,
    )
    .await
    .unwrap();

    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_read_missing_user_is_none() {
    let api = FakeApi::default();
    assert!(read(&api, "auth0|gone", Some("db")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let api = FakeApi::default();
    let state = create(&api, &config(json!({"connection_name": "db"})))
        .await
        .unwrap();

    delete(&api, &state.user_id).await.unwrap();
    delete(&api, &state.user_id).await.unwrap();
    assert!(read(&api, &state.user_id, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_operations_accept_trait_objects() {
    let api: Box<dyn ManagementApi> = Box::new(FakeApi::default());
    let state = create(api.as_ref(), &config(json!({"connection_name": "db"})))
        .await
        .unwrap();
    assert_eq!(state.user_id, "auth0|generated");
}

// ============================================================================
// Client data source
// ============================================================================

fn api_with_client() -> FakeApi {
    let api = FakeApi::default();
    api.clients.lock().unwrap().insert(
        "my_client_id".to_string(),
        Client {
            client_id: "my_client_id".to_string(),
            name: Some("My App".to_string()),
            app_type: Some("regular_web".to_string()),
            callbacks: vec!["https://app.example.com/callback".to_string()],
            client_metadata: Some(metadata(json!({"team": "web", "cost_center": "42"}))),
            ..Client::default()
        },
    );
    api
}

#[tokio::test]
async fn test_read_client_reflects_metadata() {
    let api = api_with_client();
    let state = read_client(&api, &record(json!({"client_id": "my_client_id"})))
        .await
        .unwrap();

    assert_eq!(state.client_id, "my_client_id");
    assert_eq!(state.name.as_deref(), Some("My App"));
    assert_eq!(
        state.client_metadata.raw,
        "{\"cost_center\":\"42\",\"team\":\"web\"}"
    );

    let record = state.to_record();
    assert_eq!(record["client_id"], json!("my_client_id"));
    assert_eq!(record["callbacks"], json!(["https://app.example.com/callback"]));
    assert_eq!(record["allowed_origins"], json!([]));
    assert!(!record.contains_key("description"));
    assert_eq!(
        record["client_metadata"],
        json!({"cost_center": "42", "team": "web"})
    );
}

#[tokio::test]
async fn test_read_client_requires_client_id() {
    let api = api_with_client();

    let err = read_client(&api, &JsonObject::new()).await.unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "client_id"));

    let err = read_client_by_id(&api, "  ").await.unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "client_id"));
}

#[tokio::test]
async fn test_read_client_rejects_computed_arguments() {
    let api = api_with_client();
    let err = read_client(
        &api,
        &record(json!({"client_id": "my_client_id", "name": "override"})),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "name"));
}

#[tokio::test]
async fn test_read_unknown_client() {
    let api = api_with_client();
    let err = read_client_by_id(&api, "unknown").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
