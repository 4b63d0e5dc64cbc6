//! Rule configuration
//!
//! Keyword rules, the category taxonomy and recurring-detection thresholds
//! are described in TOML.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path given by the caller
//! 2. Override in the data dir (~/.local/share/clearbook/config/rules.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! This module only parses text and computes paths; reading the file is left
//! to the caller.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, CategoryRule, VendorRule};
use crate::recurring::RecurringConfig;
use crate::rules::sort_by_specificity;

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/rules.toml");

/// Parsed rule configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub category_rules: Vec<CategoryRule>,
    pub vendor_rules: Vec<VendorRule>,
    pub categories: Vec<Category>,
    pub recurring: RecurringConfig,
}

impl RulesConfig {
    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid rules TOML: {}", e)))?;
        debug!(
            category_rules = config.category_rules.len(),
            vendor_rules = config.vendor_rules.len(),
            categories = config.categories.len(),
            "Loaded rule configuration"
        );
        Ok(config)
    }

    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Category rules in match order
    pub fn sorted_category_rules(&self) -> Vec<CategoryRule> {
        let mut rules = self.category_rules.clone();
        sort_by_specificity(&mut rules);
        rules
    }

    /// Vendor rules in match order
    pub fn sorted_vendor_rules(&self) -> Vec<VendorRule> {
        let mut rules = self.vendor_rules.clone();
        sort_by_specificity(&mut rules);
        rules
    }

    /// Taxonomy, or None when the config defines no categories
    pub fn taxonomy(&self) -> Option<&[Category]> {
        (!self.categories.is_empty()).then_some(self.categories.as_slice())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("clearbook").join("config").join("rules.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleScope;

    #[test]
    fn test_parse_default_config() {
        let config = RulesConfig::embedded().unwrap();
        assert!(!config.category_rules.is_empty());
        assert!(!config.vendor_rules.is_empty());
        assert!(config.taxonomy().is_some());
        assert_eq!(config.recurring, RecurringConfig::default());
    }

    #[test]
    fn test_default_config_leaf_categories_have_groups() {
        let config = RulesConfig::embedded().unwrap();
        for category in config.categories.iter().filter(|c| !c.is_group()) {
            let parent = category.parent.as_deref().unwrap();
            assert!(
                config.categories.iter().any(|c| c.name == parent),
                "{} has unknown parent {}",
                category.name,
                parent
            );
        }
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[[category_rules]]
keyword = "AMAZON"
category = "Shopping"

[[category_rules]]
keyword = "AMAZON MKTPLACE"
category = "Online Shopping"
priority = 2
scope = { user = 42 }

[recurring]
min_occurrences = 4
"#;
        let config = RulesConfig::from_toml(toml).unwrap();
        assert_eq!(config.category_rules.len(), 2);
        assert_eq!(config.category_rules[0].priority, 0);
        assert_eq!(config.category_rules[0].scope, RuleScope::Global);
        assert_eq!(config.category_rules[1].scope, RuleScope::User(42));
        assert!(config.vendor_rules.is_empty());
        assert!(config.taxonomy().is_none());
        assert_eq!(config.recurring.min_occurrences, 4);
        assert_eq!(config.recurring.gap_tolerance_days, 5.0);

        let sorted = config.sorted_category_rules();
        assert_eq!(sorted[0].keyword, "AMAZON MKTPLACE");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RulesConfig::from_toml("").unwrap();
        assert_eq!(config, RulesConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let err = RulesConfig::from_toml("[[category_rules]]\nkeyword = 5").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_config_path_ends_with_rules_toml() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("clearbook/config/rules.toml"));
        }
    }
}
