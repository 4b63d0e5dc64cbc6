//! Error types for clearbook

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown bank format: {0}")]
    UnknownBankFormat(String),

    #[error("Unrecognized {format} schema: missing {}", missing.join(", "))]
    UnrecognizedSchema {
        format: String,
        missing: Vec<String>,
    },

    #[error("Row {line}: {reason}")]
    RowParse { line: u64, reason: String },

    #[error("Failed to read CSV stream: {0}")]
    StreamRead(#[from] csv::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
