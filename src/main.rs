//! Bootwire - component container with staged bootstrap
//!
//! Main entry point for the bootwire CLI.

mod cli;
mod cmd_container;
mod cmd_validate;
mod demo;

use std::path::PathBuf;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bootwire_config::{ConfigLoader, LoggingConfig};

use cli::{Cli, Commands};

/// Initialize tracing with stderr output and optional rotated log files.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = match &logging.directory {
        Some(dir) => {
            let log_dir = PathBuf::from(ConfigLoader::expand_path(&dir.to_string_lossy()));
            std::fs::create_dir_all(&log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("bootwire")
                .filename_suffix("log")
                .max_log_files(14)
                .build(&log_dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keeps the writer thread alive until exit
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    // stdout belongs to command output
    let json = (logging.format == "json").then(|| fmt::layer().json().with_writer(std::io::stderr));
    let compact =
        (logging.format == "compact").then(|| fmt::layer().compact().with_writer(std::io::stderr));
    let pretty = (logging.format != "json" && logging.format != "compact").then(|| {
        fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(compact)
        .with(pretty)
        .with(file_layer)
        .init();

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_default()?,
    };

    init_tracing(&config.logging)?;

    match cli.command.unwrap_or(Commands::Run { no_demo: false }) {
        Commands::Run { no_demo } => cmd_container::handle_run(&config, !no_demo),
        Commands::Describe { no_demo, format } => {
            cmd_container::handle_describe(&config, !no_demo, &format)
        }
        Commands::Validate => cmd_validate::handle_validate(&config),
    }
}
