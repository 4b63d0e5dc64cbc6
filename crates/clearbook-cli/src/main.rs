//! Clearbook CLI - Bank CSV import and transaction classification
//!
//! Usage:
//!   clearbook formats                        List supported bank formats
//!   clearbook import --file CSV              Import and classify (auto-detects bank format)
//!   clearbook categorize --description TEXT  Preview rule matches for a description
//!   clearbook recurring --file CSV           Suggest recurring charges

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Formats => commands::cmd_formats(),
        Commands::Import {
            file,
            format,
            account,
            rules,
            json,
        } => commands::cmd_import(
            &file,
            format.as_deref(),
            account.as_deref(),
            rules.as_deref(),
            json,
        ),
        Commands::Categorize { description, rules } => {
            commands::cmd_categorize(&description, rules.as_deref())
        }
        Commands::Recurring {
            files,
            format,
            as_of,
            tracked,
            rules,
            json,
        } => commands::cmd_recurring(
            &files,
            format.as_deref(),
            as_of.as_deref(),
            &tracked,
            rules.as_deref(),
            json,
        ),
    }
}
