//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Clearbook - Import, categorize and find recurring charges in bank exports
#[derive(Parser)]
#[command(name = "clearbook")]
#[command(about = "Bank CSV import and transaction classification", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List supported bank formats
    Formats,

    /// Parse a CSV export and classify its transactions
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Bank format (auto-detected if not specified)
        #[arg(short = 'F', long)]
        format: Option<String>,

        /// Account name used in log output
        #[arg(short, long)]
        account: Option<String>,

        /// Rules file (defaults to the data-dir override, then built-in rules)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the category and vendor the rules assign to a description
    Categorize {
        /// Transaction description as it appears on a statement
        #[arg(short, long)]
        description: String,

        /// Rules file (defaults to the data-dir override, then built-in rules)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Find recurring charges across one or more CSV exports
    Recurring {
        /// CSV files to scan (repeatable)
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Bank format for every file (auto-detected per file if not specified)
        #[arg(short = 'F', long)]
        format: Option<String>,

        /// Reference date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Vendor already tracked as recurring (repeatable)
        #[arg(short, long)]
        tracked: Vec<String>,

        /// Rules file (defaults to the data-dir override, then built-in rules)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
