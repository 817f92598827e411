//! Provider configuration
//!
//! The provider needs the tenant domain and a management API token. Values
//! come from a YAML file and can be overridden by environment variables:
//!
//! ```yaml
//! domain: acme.eu.auth0.com
//! api_token: eyJhbGciOi...
//! http:
//!   timeout_secs: 30
//!   max_retries: 3
//!   requests_per_second: 10
//!   burst_size: 10
//! ```

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding `domain`
pub const ENV_DOMAIN: &str = "IDP_DOMAIN";
/// Environment variable overriding `api_token`
pub const ENV_API_TOKEN: &str = "IDP_API_TOKEN";
/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "IDP_BASE_URL";

/// Provider connection settings
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Tenant domain (e.g. "acme.eu.auth0.com")
    #[serde(default)]
    pub domain: Option<String>,

    /// Pre-issued management API token
    #[serde(default)]
    pub api_token: Option<String>,

    /// Management API base URL, derived from the domain when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("domain", &self.domain)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("http", &self.http)
            .finish()
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy between retries
    #[serde(default)]
    pub backoff: BackoffType,

    /// Requests per second (0 disables rate limiting)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst_size() -> u32 {
    10
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

impl ProviderConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        debug!("Loaded provider config from {}", path.display());
        Self::from_yaml(&contents)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from a variable lookup (normally the environment)
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(domain) = non_empty(ENV_DOMAIN) {
            self.domain = Some(domain);
        }
        if let Some(token) = non_empty(ENV_API_TOKEN) {
            self.api_token = Some(token);
        }
        if let Some(base_url) = non_empty(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
        self
    }

    /// Check that the settings needed to reach the API are present
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_none() && self.base_url.is_none() {
            return Err(Error::missing_field("domain"));
        }
        if self.api_token.is_none() {
            return Err(Error::missing_field("api_token"));
        }
        if let Some(ref base_url) = self.base_url {
            url::Url::parse(base_url).map_err(|e| Error::InvalidConfigValue {
                field: "base_url".to_string(),
                message: e.to_string(),
            })?;
        }
        if let Some(ref domain) = self.domain {
            if domain.contains("://") || domain.contains('/') {
                return Err(Error::InvalidConfigValue {
                    field: "domain".to_string(),
                    message: "expected a bare host name such as 'acme.auth0.com'".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Management API base URL
    pub fn api_base_url(&self) -> Result<String> {
        match (&self.base_url, &self.domain) {
            (Some(base_url), _) => Ok(base_url.trim_end_matches('/').to_string()),
            (None, Some(domain)) => Ok(format!("https://{domain}/api/v2")),
            (None, None) => Err(Error::missing_field("domain")),
        }
    }

    /// Build the HTTP client configuration
    pub fn http_client_config(&self) -> Result<HttpClientConfig> {
        self.validate()?;

        let mut builder = HttpClientConfig::builder()
            .base_url(self.api_base_url()?)
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(250),
                Duration::from_secs(30),
            );
        if let Some(ref token) = self.api_token {
            builder = builder.api_token(token);
        }
        builder = if self.http.requests_per_second == 0 {
            builder.no_rate_limit()
        } else {
            builder.rate_limit(RateLimiterConfig::new(
                self.http.requests_per_second,
                self.http.burst_size,
            ))
        };
        Ok(builder.build())
    }
}
