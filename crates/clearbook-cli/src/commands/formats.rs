//! Format listing command

use anyhow::Result;
use clearbook_core::{import::FORMATS, parsers};

pub fn cmd_formats() -> Result<()> {
    println!("Supported formats:");
    println!();
    println!("{:<16} {:<30} ALIASES", "ID", "NAME");
    println!("{}", "-".repeat(64));

    for parser in parsers() {
        println!(
            "{:<16} {:<30} {}",
            parser.id(),
            parser.name(),
            aliases(parser.id()).join(", ")
        );
    }

    println!();
    println!("Omit --format to auto-detect from the CSV header.");
    Ok(())
}

/// Alternative identifiers accepted for a format
pub fn aliases(id: &str) -> Vec<&'static str> {
    FORMATS
        .iter()
        .find(|spec| spec.id() == id)
        .map(|spec| spec.ids[1..].to_vec())
        .unwrap_or_else(|| clearbook_core::import::UNIVERSAL_IDS[1..].to_vec())
}
