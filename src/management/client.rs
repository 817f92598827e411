//! Management API trait and HTTP implementation

use super::models::{Client, User};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

/// Operations the resources need from the management API
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Create a user, returning the stored record
    async fn create_user(&self, user: &User) -> Result<User>;

    /// Read a user by id
    async fn read_user(&self, user_id: &str) -> Result<User>;

    /// Patch a user, returning the stored record
    async fn update_user(&self, user_id: &str, user: &User) -> Result<User>;

    /// Delete a user
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    /// Read an application client by client id
    async fn read_client(&self, client_id: &str) -> Result<Client>;
}

/// HTTP client for the management API
#[derive(Debug)]
pub struct ManagementClient {
    http: HttpClient,
    base_url: Url,
}

impl ManagementClient {
    /// Build a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = HttpClient::with_config(config.http_client_config()?)?;
        let base_url = config.api_base_url()?;
        Self::with_http(http, &base_url)
    }

    /// Build a client over an existing HTTP client
    pub fn with_http(http: HttpClient, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfigValue {
                field: "base_url".to_string(),
                message: format!("'{base_url}' cannot be used as a base URL"),
            });
        }
        // Keep a trailing slash off so segments append cleanly
        let trimmed = base_url.path().trim_end_matches('/').to_string();
        base_url.set_path(&trimmed);
        Ok(Self { http, base_url })
    }

    /// Absolute URL for a path below the API root, encoding each segment
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }
}

fn not_found_as(resource: &str, id: &str) -> impl FnOnce(Error) -> Error {
    let resource = resource.to_string();
    let id = id.to_string();
    move |e| match e {
        Error::HttpStatus { status: 404, .. } => Error::not_found(resource, id),
        other => other,
    }
}

#[async_trait]
impl ManagementApi for ManagementClient {
    async fn create_user(&self, user: &User) -> Result<User> {
        let created: User = self.http.post_json(&self.endpoint(&["users"]), user).await?;
        info!(
            user_id = created.user_id.as_deref().unwrap_or_default(),
            "Created user"
        );
        Ok(created)
    }

    async fn read_user(&self, user_id: &str) -> Result<User> {
        debug!(user_id, "Reading user");
        self.http
            .get_json(&self.endpoint(&["users", user_id]))
            .await
            .map_err(not_found_as("user", user_id))
    }

    async fn update_user(&self, user_id: &str, user: &User) -> Result<User> {
        let updated = self
            .http
            .patch_json(&self.endpoint(&["users", user_id]), user)
            .await
            .map_err(not_found_as("user", user_id))?;
        info!(user_id, "Updated user");
        Ok(updated)
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.http
            .delete(&self.endpoint(&["users", user_id]))
            .await
            .map_err(not_found_as("user", user_id))?;
        info!(user_id, "Deleted user");
        Ok(())
    }

    async fn read_client(&self, client_id: &str) -> Result<Client> {
        debug!(client_id, "Reading client");
        self.http
            .get_json(&self.endpoint(&["clients", client_id]))
            .await
            .map_err(not_found_as("client", client_id))
    }
}
