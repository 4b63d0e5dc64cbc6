//! Shared command utilities: rule loading, CSV reading and enrichment

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use clearbook_core::{
    classify_transaction, config::default_config_path, detect_format, select_parser,
    CategorizationContext, Categorizer, CategoryRule, Parser, RulesConfig, Transaction,
    VendorRule,
};
use tracing::{debug, info};

/// Load rule configuration
///
/// An explicit path must exist. Otherwise the data-dir override is used when
/// present, then the built-in rules.
pub fn load_rules(path: Option<&Path>) -> Result<RulesConfig> {
    if let Some(path) = path {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
        info!("Using rules from {}", path.display());
        return RulesConfig::from_toml(&content)
            .with_context(|| format!("Invalid rules file: {}", path.display()));
    }

    if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let content = fs::read_to_string(&default_path).with_context(|| {
                format!("Failed to read rules file: {}", default_path.display())
            })?;
            info!("Using rules from {}", default_path.display());
            return RulesConfig::from_toml(&content)
                .with_context(|| format!("Invalid rules file: {}", default_path.display()));
        }
    }

    debug!("Using built-in rules");
    Ok(RulesConfig::embedded()?)
}

/// Pick the parser for a file: the named format, else auto-detection from
/// the header line, else the universal parser
pub fn resolve_parser(file: &Path, format: Option<&str>) -> Result<Parser> {
    if let Some(format) = format {
        return Ok(select_parser(format)?);
    }

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let mut header_line = Vec::new();
    BufReader::new(csv_file)
        .read_until(b'\n', &mut header_line)
        .with_context(|| "Failed to read CSV header")?;

    let id = detect_format(&String::from_utf8_lossy(&header_line)).unwrap_or_else(|| {
        debug!("No known bank layout in {}, using universal parser", file.display());
        "universal"
    });
    Ok(select_parser(id)?)
}

/// Parse every transaction in a CSV file
pub fn read_transactions(
    file: &Path,
    format: Option<&str>,
    account: &str,
) -> Result<(Parser, Vec<Transaction>)> {
    let parser = resolve_parser(file, format)?;

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let transactions = parser
        .parse_all(account, csv_file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    Ok((parser, transactions))
}

/// Rules loaded once and sorted into match order
pub struct Classifier {
    category_rules: Vec<CategoryRule>,
    vendor_rules: Vec<VendorRule>,
    config: RulesConfig,
    categorizer: Categorizer,
}

impl Classifier {
    pub fn new(config: RulesConfig) -> Self {
        Self {
            category_rules: config.sorted_category_rules(),
            vendor_rules: config.sorted_vendor_rules(),
            config,
            categorizer: Categorizer::default(),
        }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    fn context(&self) -> CategorizationContext<'_> {
        match self.config.taxonomy() {
            Some(taxonomy) => CategorizationContext::with_taxonomy(&self.category_rules, taxonomy),
            None => CategorizationContext::new(&self.category_rules),
        }
    }

    /// Copy of the transaction with category and vendor set
    pub fn classify(&self, tx: &Transaction) -> Transaction {
        classify_transaction(tx, &self.categorizer, &self.context(), &self.vendor_rules)
    }

    pub fn classify_all(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions.iter().map(|tx| self.classify(tx)).collect()
    }
}
