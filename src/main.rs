//! Folio command-line entry point.
//!
//! Loads configuration, initializes logging, and dispatches to the
//! collection, content, catalog and migration commands.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use folio_core::config::LoggingConfig;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(config).await {
        tracing::error!(error = %e, "Command failed");
        output::print_error(&e.to_string());
        if e.is_retryable() {
            output::print_warning("The collection changed while the command ran; run it again.");
        }
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. `RUST_LOG` overrides the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
