//! CLI module
//!
//! Command-line interface over the user resource and client data source.
//!
//! # Commands
//!
//! Offline, no API access needed:
//! - `validate` - Check a desired-state record against the user schema
//! - `resolve` - Resolve one metadata pair to the value that would be sent
//! - `reflect` - Turn a remote user into a state record
//! - `plan` - List drifted attributes
//!
//! Online, against the management API:
//! - `read-user`, `read-client`, `apply`, `destroy`

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{read_record, Runner};

#[cfg(test)]
mod tests;
