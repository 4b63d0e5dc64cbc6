//! Clearbook Core Library
//!
//! Transaction ingestion and classification for personal finance:
//! - CSV import parsers for known bank layouts plus a header-sniffing fallback
//! - Keyword-rule categorization with a pluggable strategy chain
//! - Vendor name cleaning
//! - Recurring payment detection
//! - Rule configuration loaded from TOML

pub mod categorize;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod recurring;
pub mod rules;
pub mod vendor;

pub use categorize::{CategorizationContext, Categorizer, Strategy, UNCATEGORIZED};
pub use config::RulesConfig;
pub use error::{Error, Result};
pub use import::{detect_format, parsers, select_parser, Parser, TransactionStream};
pub use models::*;
pub use recurring::{RecurringConfig, RecurringDetector};
pub use rules::{sort_by_specificity, KeywordRule};
pub use vendor::{classify_transaction, clean_vendor, enrich_vendor};
