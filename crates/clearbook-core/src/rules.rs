//! Keyword rule matching shared by categorization and vendor cleaning
//!
//! Rules are matched by case-insensitive substring against the transaction
//! description. The first matching rule in the supplied order wins, so callers
//! must pass rules sorted with [`sort_by_specificity`] (priority descending,
//! then keyword length descending). The matchers never sort or cache.

use std::cmp::Reverse;

use crate::models::{CategoryRule, VendorRule};

/// A (keyword, label, priority) rule
pub trait KeywordRule {
    fn keyword(&self) -> &str;
    fn label(&self) -> &str;
    fn priority(&self) -> i32;
}

impl KeywordRule for CategoryRule {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn label(&self) -> &str {
        &self.category
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

impl KeywordRule for VendorRule {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn label(&self) -> &str {
        &self.vendor
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Sort rules so the most specific rule comes first
///
/// Priority descending, then keyword length descending. The sort is stable:
/// rules that tie on both keep their relative order.
pub fn sort_by_specificity<T: KeywordRule>(rules: &mut [T]) {
    rules.sort_by_key(|rule| (Reverse(rule.priority()), Reverse(rule.keyword().chars().count())));
}

/// Whether the rule's keyword occurs in an already upper-cased description
pub fn keyword_matches<T: KeywordRule>(rule: &T, upper_description: &str) -> bool {
    let keyword = rule.keyword().trim();
    !keyword.is_empty() && upper_description.contains(&keyword.to_uppercase())
}

/// First rule (in the given order) whose keyword occurs in the description
/// and which `accept` does not reject
pub fn first_match<'r, T, F>(rules: &'r [T], description: &str, mut accept: F) -> Option<&'r T>
where
    T: KeywordRule,
    F: FnMut(&T) -> bool,
{
    let upper = description.to_uppercase();
    rules
        .iter()
        .filter(|rule| keyword_matches(*rule, &upper))
        .find(|rule| accept(rule))
}
