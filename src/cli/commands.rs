//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Identity platform provider CLI
#[derive(Parser, Debug)]
#[command(name = "idp-provider")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Provider configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
///
/// Record arguments are paths to JSON files; `-` reads stdin.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a desired-state user record
    Validate {
        /// Desired-state record
        record: PathBuf,
    },

    /// Resolve one metadata pair of a desired-state record
    Resolve {
        /// Desired-state record
        record: PathBuf,

        /// Metadata attribute name (e.g. app_metadata)
        #[arg(long, default_value = "app_metadata")]
        field: String,
    },

    /// Reflect a remote user into a state record
    Reflect {
        /// Remote user as returned by the management API
        user: PathBuf,

        /// Connection to record when the remote user omits it
        #[arg(long)]
        connection: Option<String>,
    },

    /// Show attributes that differ between desired and stored state
    Plan {
        /// Desired-state record
        record: PathBuf,

        /// Stored state record
        #[arg(long)]
        state: PathBuf,
    },

    /// Read a user from the management API
    ReadUser {
        /// Stored user id
        user_id: String,

        /// Connection to record in the state
        #[arg(long)]
        connection: Option<String>,
    },

    /// Read an application client from the management API
    ReadClient {
        /// Client id
        client_id: String,
    },

    /// Create or update a user from a desired-state record
    Apply {
        /// Desired-state record
        record: PathBuf,

        /// Stored state record; the user is created when omitted
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Delete a user
    Destroy {
        /// Stored user id
        user_id: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
