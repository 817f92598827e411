//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ProviderConfig;
use crate::error::{Error, Result, ResultExt};
use crate::management::{ManagementClient, User};
use crate::metadata::MetadataReconciler;
use crate::resources::{client, user, user_schema, UserConfig, UserState};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and print its result
    pub async fn run(&self) -> Result<()> {
        let output = self.execute().await?;
        self.output_message(&output);
        Ok(())
    }

    /// Run the CLI command and return its result
    pub async fn execute(&self) -> Result<JsonValue> {
        match &self.cli.command {
            Commands::Validate { record } => self.validate(record),
            Commands::Resolve { record, field } => self.resolve(record, field),
            Commands::Reflect { user, connection } => self.reflect(user, connection.as_deref()),
            Commands::Plan { record, state } => self.plan(record, state),
            Commands::ReadUser {
                user_id,
                connection,
            } => self.read_user(user_id, connection.as_deref()).await,
            Commands::ReadClient { client_id } => self.read_client(client_id).await,
            Commands::Apply { record, state } => self.apply(record, state.as_deref()).await,
            Commands::Destroy { user_id } => self.destroy(user_id).await,
        }
    }

    /// Management API client from the provider configuration
    fn management_client(&self) -> Result<ManagementClient> {
        let config = ProviderConfig::load(self.cli.config.as_deref())?;
        debug!(?config, "Loaded provider configuration");
        ManagementClient::new(&config)
    }

    fn validate(&self, record: &Path) -> Result<JsonValue> {
        let record = read_record(record)?;
        UserConfig::from_record(&record)?;
        Ok(json!({ "valid": true }))
    }

    fn resolve(&self, record: &Path, field: &str) -> Result<JsonValue> {
        let record = read_record(record)?;
        let resolved = MetadataReconciler::for_field(field).resolve_record(&record)?;
        Ok(json!({
            "field": field,
            "value": resolved,
        }))
    }

    fn reflect(&self, remote: &Path, connection: Option<&str>) -> Result<JsonValue> {
        let remote: User = serde_json::from_value(JsonValue::Object(read_record(remote)?))
            .context("Remote user is not a valid user record")?;
        let state = UserState::reflect(&remote, connection)?;
        Ok(JsonValue::Object(state.to_record()))
    }

    fn plan(&self, record: &Path, state: &Path) -> Result<JsonValue> {
        let config = UserConfig::from_record(&read_record(record)?)?;
        let state = UserState::from_record(&read_record(state)?)?;
        let drift = user::plan(&config, &state)?;
        Ok(json!({
            "user_id": state.user_id,
            "drift": drift,
        }))
    }

    async fn read_user(&self, user_id: &str, connection: Option<&str>) -> Result<JsonValue> {
        let api = self.management_client()?;
        let state = user::read(&api, user_id, connection).await?;
        Ok(state.map_or(JsonValue::Null, |s| JsonValue::Object(s.to_record())))
    }

    async fn read_client(&self, client_id: &str) -> Result<JsonValue> {
        let api = self.management_client()?;
        let state = client::read_client_by_id(&api, client_id).await?;
        Ok(JsonValue::Object(state.to_record()))
    }

    async fn apply(&self, record: &Path, state: Option<&Path>) -> Result<JsonValue> {
        // Everything local is checked before the API is touched
        let mut desired = read_record(record)?;
        let config = UserConfig::from_record(&desired)?;
        user_schema().redact(&mut desired);
        debug!(record = %JsonValue::Object(desired), "Applying desired state");
        let prior = state
            .map(|path| read_record(path).and_then(|r| UserState::from_record(&r)))
            .transpose()?;
        let api = self.management_client()?;

        let state = match prior {
            Some(prior) => user::update(&api, &config, &prior).await?,
            None => user::create(&api, &config).await?,
        };
        Ok(JsonValue::Object(state.to_record()))
    }

    async fn destroy(&self, user_id: &str) -> Result<JsonValue> {
        let api = self.management_client()?;
        user::delete(&api, user_id).await?;
        Ok(json!({ "deleted": user_id }))
    }

    /// Output a message in the requested format
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Read a JSON object from a file, or from stdin when the path is `-`
pub fn read_record(path: &Path) -> Result<JsonObject> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        std::fs::read_to_string(path)?
    };

    match serde_json::from_str(&contents)? {
        JsonValue::Object(record) => Ok(record),
        other => Err(Error::Other(format!(
            "{}: expected a JSON object, got {}",
            path.display(),
            crate::metadata::json_kind(&other)
        ))),
    }
}
