// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Identity Platform Provider
//!
//! Desired-state management for identity platform users and clients over the
//! management API, with metadata attributes reconciled between two surfaces.
//!
//! ## Features
//!
//! - **Metadata Reconciliation**: `app_metadata`, `user_metadata` and
//!   `client_metadata` accept a structured map or a raw JSON string, never both
//! - **Canonical Reflection**: remote metadata is written back as both a map
//!   and a sorted-key JSON string, so either surface compares without drift
//! - **Schema Validation**: attribute types, required and computed fields,
//!   conflicting pairs and raw JSON checks, all reported at once
//! - **Management API Client**: retries, backoff and rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use idp_provider::resources::{user, UserConfig};
//! use idp_provider::{ManagementClient, ProviderConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ProviderConfig::load(None)?;
//!     let api = ManagementClient::new(&config)?;
//!
//!     let desired = serde_json::json!({
//!         "connection_name": "Username-Password-Authentication",
//!         "email": "alice@example.com",
//!         "app_metadata_json": "{\"role\": \"admin\"}"
//!     });
//!     let desired = UserConfig::from_record(desired.as_object().unwrap())?;
//!
//!     let state = user::create(&api, &desired).await?;
//!     println!("{}", state.app_metadata.raw);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Resources                              │
//! │   user: from_record → build_user → create/update → reflect      │
//! │   client: read_client → reflect                                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬──────────────────────────┐
//! │    Schema    │       Metadata        │      Management API      │
//! ├──────────────┼───────────────────────┼──────────────────────────┤
//! │ Types        │ MetadataInput         │ ManagementApi trait      │
//! │ Required     │ resolve               │ HTTP client              │
//! │ Conflicts    │ reflect (canonical)   │ Retry / Rate Limit       │
//! └──────────────┴───────────────────────┴──────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Metadata pair reconciliation
pub mod metadata;

/// Attribute schemas and validation
pub mod schema;

/// HTTP client with retry and rate limiting
pub mod http;

/// Provider configuration
pub mod config;

/// Management API models and client
pub mod management;

/// User resource and client data source
pub mod resources;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ProviderConfig;
pub use management::{ManagementApi, ManagementClient};
pub use metadata::{MetadataInput, MetadataReconciler, ReflectedMetadata};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
