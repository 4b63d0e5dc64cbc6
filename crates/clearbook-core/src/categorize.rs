//! Transaction categorization
//!
//! Categorization is a chain of pure strategies. Each strategy looks at a
//! transaction plus the caller-supplied context and may return a category
//! name. Strategies run in ascending `order`; the first one that returns a
//! name decides. When none do, the result is [`UNCATEGORIZED`].
//!
//! New heuristics are added by appending a [`Strategy`], never by changing
//! the existing ones.

use tracing::debug;

use crate::models::{Category, CategoryRule, Transaction};
use crate::rules::{first_match, KeywordRule};

/// Category returned when no strategy matches
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Inputs shared by every strategy for one call
#[derive(Debug, Clone, Copy)]
pub struct CategorizationContext<'a> {
    /// Rules sorted by priority desc, then keyword length desc
    pub rules: &'a [CategoryRule],
    /// Optional taxonomy used to reject group categories
    pub taxonomy: Option<&'a [Category]>,
}

impl<'a> CategorizationContext<'a> {
    pub fn new(rules: &'a [CategoryRule]) -> Self {
        Self {
            rules,
            taxonomy: None,
        }
    }

    pub fn with_taxonomy(rules: &'a [CategoryRule], taxonomy: &'a [Category]) -> Self {
        Self {
            rules,
            taxonomy: Some(taxonomy),
        }
    }

    /// Whether `name` is a group (top-level) category in the taxonomy
    ///
    /// Names missing from the taxonomy are not groups.
    pub fn is_group(&self, name: &str) -> bool {
        self.taxonomy.is_some_and(|taxonomy| {
            taxonomy
                .iter()
                .any(|c| c.is_group() && c.name.eq_ignore_ascii_case(name))
        })
    }
}

/// Signature of a classification strategy
pub type ClassifyFn = fn(&Transaction, &CategorizationContext<'_>) -> Option<String>;

/// One named step in the categorization chain
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub order: i32,
    pub classify: ClassifyFn,
}

/// Keyword rules against the raw bank description
///
/// Matches `original_vendor`, so a bank category appended to the display
/// description never decides the result. A rule pointing at a group category is skipped when a taxonomy is
/// supplied, and scanning continues with the next rule.
pub fn keyword_strategy(tx: &Transaction, ctx: &CategorizationContext<'_>) -> Option<String> {
    first_match(ctx.rules, &tx.original_vendor, |rule| {
        let is_group = ctx.is_group(rule.label());
        if is_group {
            debug!(
                keyword = rule.keyword(),
                category = rule.label(),
                "Skipping rule that targets a group category"
            );
        }
        !is_group
    })
    .map(|rule| rule.label().to_string())
}

/// Ordered chain of categorization strategies
#[derive(Debug, Clone)]
pub struct Categorizer {
    strategies: Vec<Strategy>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(vec![Strategy {
            name: "keyword_rules",
            order: 100,
            classify: keyword_strategy,
        }])
    }
}

impl Categorizer {
    pub fn new(mut strategies: Vec<Strategy>) -> Self {
        strategies.sort_by_key(|s| s.order);
        Self { strategies }
    }

    /// Append a strategy, keeping the chain ordered
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| s.order);
        self
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Category name for a transaction, or [`UNCATEGORIZED`]
    pub fn categorize(&self, tx: &Transaction, ctx: &CategorizationContext<'_>) -> String {
        self.strategies
            .iter()
            .find_map(|strategy| {
                let category = (strategy.classify)(tx, ctx)?;
                debug!(
                    strategy = strategy.name,
                    category = %category,
                    "Categorized {}",
                    tx.original_vendor
                );
                Some(category)
            })
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    }

    /// Copy of the transaction with its category set
    pub fn enrich(&self, tx: &Transaction, ctx: &CategorizationContext<'_>) -> Transaction {
        tx.with_category(self.categorize(tx, ctx))
    }
}
