//! Recurring payment detection
//!
//! Looks for expenses that repeat at a steady interval with an identical
//! amount and proposes them as recurring bills or subscriptions. Vendors the
//! caller already tracks are excluded so only new patterns are suggested.

use std::collections::BTreeMap;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Frequency, RecurringSuggestion, Transaction, TransactionType};

/// Thresholds for recurring detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringConfig {
    /// Minimum charges in a group before it can be a pattern
    pub min_occurrences: usize,
    /// Allowed distance of every gap from the mean gap, in days
    pub gap_tolerance_days: f64,
    /// How far back from the as-of date history is considered
    pub lookback_months: u32,
    /// Confidence before counting occurrences
    pub base_confidence: f64,
    /// Confidence added per occurrence
    pub confidence_step: f64,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            gap_tolerance_days: 5.0,
            lookback_months: 12,
            base_confidence: 0.8,
            confidence_step: 0.05,
        }
    }
}

/// Detects recurring expense patterns in transaction history
#[derive(Debug, Clone, Default)]
pub struct RecurringDetector {
    config: RecurringConfig,
}

impl RecurringDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RecurringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecurringConfig {
        &self.config
    }

    /// Suggest recurring payments found in `history`
    ///
    /// Only expenses dated within the lookback window ending at `as_of`
    /// (inclusive) are considered. Transactions whose vendor name matches one
    /// of `tracked` (case-insensitive) are ignored. Results are sorted by
    /// confidence descending, then vendor name.
    pub fn detect(
        &self,
        history: &[Transaction],
        tracked: &[String],
        as_of: NaiveDate,
    ) -> Vec<RecurringSuggestion> {
        let window_start = as_of
            .checked_sub_months(Months::new(self.config.lookback_months))
            .unwrap_or(NaiveDate::MIN);

        let tracked: Vec<String> = tracked
            .iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        let mut groups: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for tx in history {
            if tx.tx_type != TransactionType::Expense {
                continue;
            }
            if tx.date <= window_start || tx.date > as_of {
                continue;
            }
            let name = tx.display_vendor().trim();
            if tracked.contains(&name.to_lowercase()) {
                continue;
            }

            let key = format!("{}|{:.2}", normalize_vendor(name), tx.amount);
            groups.entry(key).or_default().push(tx);
        }

        debug!(
            "Checking {} candidate groups between {} and {}",
            groups.len(),
            window_start,
            as_of
        );

        let mut suggestions: Vec<RecurringSuggestion> = groups
            .into_iter()
            .filter_map(|(key, group)| {
                let suggestion = self.detect_group(group)?;
                debug!(
                    group = %key,
                    frequency = %suggestion.frequency,
                    occurrences = suggestion.occurrences,
                    "Recurring pattern found"
                );
                Some(suggestion)
            })
            .collect();

        suggestions.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.vendor.cmp(&b.vendor))
        });

        info!("Detected {} recurring payment(s)", suggestions.len());
        suggestions
    }

    fn detect_group(&self, mut group: Vec<&Transaction>) -> Option<RecurringSuggestion> {
        if group.len() < self.config.min_occurrences.max(2) {
            return None;
        }

        group.sort_by_key(|t| t.date);

        let gaps: Vec<i64> = group
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .collect();
        let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

        // Every gap has to be close to the mean, not just most of them
        let steady = gaps
            .iter()
            .all(|&gap| (gap as f64 - mean).abs() <= self.config.gap_tolerance_days);
        if !steady {
            return None;
        }

        let frequency = classify_interval(mean)?;
        let last = group.last()?;
        let occurrences = group.len();

        Some(RecurringSuggestion {
            vendor: last.display_vendor().trim().to_string(),
            amount: last.amount,
            frequency,
            last_date: last.date,
            next_date: next_date(last.date, frequency)?,
            occurrences,
            confidence: self.config.base_confidence
                + self.config.confidence_step * occurrences as f64,
        })
    }
}

/// Normalize a vendor name for grouping
///
/// Upper-cases, turns `*` and `#` into spaces and collapses whitespace, so
/// "SQ *COFFEE #12" and "sq coffee 12" group together.
pub fn normalize_vendor(name: &str) -> String {
    name.to_uppercase()
        .replace(['*', '#'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Frequency band for a mean gap in days
///
/// Quarterly has no band; it only exists for projecting tracked bills.
pub fn classify_interval(mean_gap_days: f64) -> Option<Frequency> {
    match mean_gap_days {
        d if (6.0..=8.0).contains(&d) => Some(Frequency::Weekly),
        d if (13.0..=16.0).contains(&d) => Some(Frequency::BiWeekly),
        d if (25.0..=35.0).contains(&d) => Some(Frequency::Monthly),
        d if (360.0..=370.0).contains(&d) => Some(Frequency::Yearly),
        _ => None,
    }
}

/// Next expected charge one period after `last`
///
/// Month-based periods use calendar arithmetic, clamping to the last day of
/// shorter months (Jan 31 + 1 month = Feb 29 in 2024).
pub fn next_date(last: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    match frequency {
        Frequency::Weekly => last.checked_add_days(Days::new(7)),
        Frequency::BiWeekly => last.checked_add_days(Days::new(14)),
        Frequency::Monthly => last.checked_add_months(Months::new(1)),
        Frequency::Quarterly => last.checked_add_months(Months::new(3)),
        Frequency::Yearly => last.checked_add_months(Months::new(12)),
    }
}
