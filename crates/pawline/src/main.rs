// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pawline - SMS message routing and assignment-conflict engine.
//!
//! This is the binary entry point for the Pawline service.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;

/// Pawline - SMS message routing and assignment-conflict engine.
#[derive(Parser, Debug)]
#[command(name = "pawline", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway and admin API.
    Serve,
    /// Dry-run the routing engine for a thread (no persistence).
    Simulate {
        /// Thread to evaluate.
        #[arg(long)]
        thread_id: String,
        /// Evaluation time (RFC3339); defaults to now.
        #[arg(long)]
        at: Option<String>,
        /// Message direction: inbound or outbound.
        #[arg(long, default_value = "inbound")]
        direction: String,
    },
    /// Expire overdue offers (cron entry point).
    ExpireOffers,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => pawline_config::load_config_from_path(path),
        None => pawline_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pawline: invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run(config).await,
        Some(Commands::Simulate {
            thread_id,
            at,
            direction,
        }) => serve::simulate(config, &thread_id, at.as_deref(), &direction).await,
        Some(Commands::ExpireOffers) => serve::expire_offers(config).await,
    };

    if let Err(e) = result {
        eprintln!("pawline: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }
}
