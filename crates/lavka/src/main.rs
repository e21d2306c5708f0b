// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lavka -- a conversational commerce bot for grocery delivery.
//!
//! This is the binary entry point.

use std::path::Path;

use clap::{Parser, Subcommand};
use lavka_config::{ConfigError, LavkaConfig};

mod serve;

/// Lavka -- a conversational commerce bot for grocery delivery.
#[derive(Parser, Debug)]
#[command(name = "lavka", version, about, long_about = None)]
struct Cli {
    /// Explicit config file path (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot (the default when no subcommand is given).
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lavka_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            // The bot access token is the one hard startup requirement.
            if let Err(errors) = lavka_config::validate_serve(&config) {
                lavka_config::render_errors(&errors);
                std::process::exit(1);
            }
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn load(path: Option<&Path>) -> Result<LavkaConfig, Vec<ConfigError>> {
    match path {
        Some(path) => lavka_config::load_and_validate_path(path),
        None => lavka_config::load_and_validate(),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn default_config_is_valid_but_cannot_serve() {
        // Defaults load fine; serving still demands the bot token.
        let config = lavka_config::load_and_validate_str("").expect("defaults should be valid");
        assert!(lavka_config::validate_serve(&config).is_err());
    }

    #[test]
    fn config_with_token_can_serve() {
        let config = lavka_config::load_and_validate_str(
            r#"
[telegram]
bot_token = "123456:ABC"
"#,
        )
        .expect("config should be valid");
        assert!(lavka_config::validate_serve(&config).is_ok());
    }
}
