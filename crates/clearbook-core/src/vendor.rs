//! Vendor name cleaning
//!
//! Maps noisy bank descriptions ("SQ *BLUE BOTTLE 0421 OAKLAND CA") to a
//! canonical vendor label using the same first-match keyword rules as
//! categorization. Unlike categorization there is no default: no match means
//! the caller keeps the raw description.

use crate::categorize::{CategorizationContext, Categorizer};
use crate::models::{Transaction, VendorRule};
use crate::rules::{first_match, KeywordRule};

/// Canonical vendor name for a transaction, if any rule matches
///
/// Matches the raw bank description (`original_vendor`), never the display
/// description with its bank category suffix. `rules` must be sorted by
/// priority desc, then keyword length desc.
pub fn clean_vendor(tx: &Transaction, rules: &[VendorRule]) -> Option<String> {
    first_match(rules, &tx.original_vendor, |_| true).map(|rule| rule.label().to_string())
}

/// Copy of the transaction with `vendor_name` set when a rule matches
pub fn enrich_vendor(tx: &Transaction, rules: &[VendorRule]) -> Transaction {
    match clean_vendor(tx, rules) {
        Some(vendor) => tx.with_vendor(vendor),
        None => tx.clone(),
    }
}

/// Run vendor cleaning and categorization, returning an enriched copy
pub fn classify_transaction(
    tx: &Transaction,
    categorizer: &Categorizer,
    ctx: &CategorizationContext<'_>,
    vendor_rules: &[VendorRule],
) -> Transaction {
    let with_vendor = enrich_vendor(tx, vendor_rules);
    categorizer.enrich(&with_vendor, ctx)
}
