//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (rule loading, CSV reading, enrichment)
//! - `formats` - List registered bank formats
//! - `import` - Parse and classify a CSV export
//! - `categorize` - Preview rule matches for one description
//! - `recurring` - Recurring charge suggestions

pub mod categorize;
pub mod common;
pub mod formats;
pub mod import;
pub mod recurring;

// Re-export command functions for main.rs
pub use categorize::*;
pub use common::*;
pub use formats::*;
pub use import::*;
pub use recurring::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
