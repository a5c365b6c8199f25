//! CLI definitions for bootwire.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bootwire CLI.
#[derive(Parser)]
#[command(name = "bootwire")]
#[command(about = "Component container with staged bootstrap")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults to ./bootwire.toml, then the user config dir)
    #[arg(short, long, global = true, env = "BOOTWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Refresh a container, print its lifecycle, then close it (default)
    Run {
        /// Only use components declared in the config file
        #[arg(long)]
        no_demo: bool,
    },

    /// Print the settled registry and interceptor chain after bootstrap
    Describe {
        /// Only use components declared in the config file
        #[arg(long)]
        no_demo: bool,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate the configuration file
    Validate,
}
