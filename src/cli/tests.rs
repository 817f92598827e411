//! Tests for the CLI runner

use super::*;
use crate::error::Error;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_json(dir: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{value}").unwrap();
    path
}

fn runner(args: &[&str]) -> Runner {
    let mut argv = vec!["idp-provider"];
    argv.extend_from_slice(args);
    Runner::new(Cli::try_parse_from(argv).unwrap())
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_parse_global_flags() {
    let cli = Cli::try_parse_from([
        "idp-provider",
        "plan",
        "desired.json",
        "--state",
        "state.json",
        "-v",
        "--format",
        "pretty",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.format, OutputFormat::Pretty);
    assert!(matches!(cli.command, Commands::Plan { .. }));
}

#[test]
fn test_read_record_rejects_non_object() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, "list.json", &json!([1, 2]));
    let err = read_record(&path).unwrap_err();
    assert!(err.to_string().contains("expected a JSON object, got array"));

    let err = read_record(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[tokio::test]
async fn test_validate_command() {
    let dir = TempDir::new().unwrap();
    let good = write_json(
        &dir,
        "good.json",
        &json!({"connection_name": "db", "app_metadata_json": "{\"a\":1}"}),
    );
    let bad = write_json(
        &dir,
        "bad.json",
        &json!({
            "connection_name": "db",
            "app_metadata": {"a": 1},
            "app_metadata_json": "{\"a\":1}"
        }),
    );

    let output = runner(&["validate", arg(&good)]).execute().await.unwrap();
    assert_eq!(output, json!({"valid": true}));

    let err = runner(&["validate", arg(&bad)]).execute().await.unwrap_err();
    assert!(err.is_user_error());
}

#[tokio::test]
async fn test_resolve_command() {
    let dir = TempDir::new().unwrap();
    let record = write_json(
        &dir,
        "record.json",
        &json!({"user_metadata_json": "{\"theme\": \"dark\"}"}),
    );

    let output = runner(&["resolve", arg(&record), "--field", "user_metadata"])
        .execute()
        .await
        .unwrap();
    assert_eq!(
        output,
        json!({"field": "user_metadata", "value": {"theme": "dark"}})
    );

    let output = runner(&["resolve", arg(&record)]).execute().await.unwrap();
    assert_eq!(output, json!({"field": "app_metadata", "value": null}));
}

#[tokio::test]
async fn test_reflect_and_plan_commands() {
    let dir = TempDir::new().unwrap();
    let remote = write_json(
        &dir,
        "remote.json",
        &json!({
            "user_id": "auth0|abc",
            "email": "a@example.com",
            "app_metadata": {"role": "admin"}
        }),
    );

    let state = runner(&["reflect", arg(&remote), "--connection", "db"])
        .execute()
        .await
        .unwrap();
    assert_eq!(state["app_metadata_json"], json!("{\"role\":\"admin\"}"));
    assert_eq!(state["connection_name"], json!("db"));

    let state_path = write_json(&dir, "state.json", &state);
    let desired = write_json(
        &dir,
        "desired.json",
        &json!({
            "connection_name": "db",
            "user_id": "abc",
            "email": "b@example.com",
            "app_metadata_json": "{\"role\": \"admin\"}"
        }),
    );

    let output = runner(&["plan", arg(&desired), "--state", arg(&state_path)])
        .execute()
        .await
        .unwrap();
    assert_eq!(output, json!({"user_id": "auth0|abc", "drift": ["email"]}));
}

#[tokio::test]
async fn test_apply_and_destroy_against_api() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config_path = dir.path().join("provider.yaml");
    std::fs::write(
        &config_path,
        format!(
            "base_url: {}/api/v2\napi_token: test-token\nhttp:\n  max_retries: 0\n  requests_per_second: 0\n",
            server.uri()
        ),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v2/users"))
        .and(body_json(json!({
            "connection": "db",
            "email": "a@example.com",
            "user_metadata": {}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user_id": "auth0|new",
            "email": "a@example.com",
            "user_metadata": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/v2/users/auth0(\||%7C)new$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let desired = write_json(
        &dir,
        "desired.json",
        &json!({
            "connection_name": "db",
            "email": "a@example.com",
            "user_metadata_json": "{}"
        }),
    );

    let state = runner(&["--config", arg(&config_path), "apply", arg(&desired)])
        .execute()
        .await
        .unwrap();
    assert_eq!(state["user_id"], json!("auth0|new"));
    assert_eq!(state["user_metadata_json"], json!("{}"));

    let output = runner(&["--config", arg(&config_path), "destroy", "auth0|new"])
        .execute()
        .await
        .unwrap();
    assert_eq!(output, json!({"deleted": "auth0|new"}));
}

#[tokio::test]
async fn test_apply_rejects_malformed_metadata_before_config() {
    let dir = TempDir::new().unwrap();
    let desired = write_json(
        &dir,
        "desired.json",
        &json!({"connection_name": "db", "app_metadata_json": "{oops"}),
    );

    // No provider config exists, so reaching the API layer would fail differently
    let err = runner(&[
        "--config",
        arg(&dir.path().join("absent.yaml")),
        "apply",
        arg(&desired),
    ])
    .execute()
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "app_metadata_json"));
}
