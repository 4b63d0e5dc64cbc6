//! Recurring charge suggestions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clearbook_core::{RecurringDetector, RecurringSuggestion};

use super::{load_rules, read_transactions, truncate, Classifier};

pub fn cmd_recurring(
    files: &[PathBuf],
    format: Option<&str>,
    as_of: Option<&str>,
    tracked: &[String],
    rules: Option<&Path>,
    json: bool,
) -> Result<()> {
    let as_of = parse_as_of(as_of)?;
    let suggestions = find_recurring(files, format, as_of, tracked, rules)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No recurring charges found as of {}.", as_of);
        return Ok(());
    }

    println!("🔁 Recurring charges as of {}", as_of);
    println!();
    println!(
        "{:<28}  {:>10}  {:<10}  {:<10}  {:<10}  {:>5}  {:>5}",
        "VENDOR", "AMOUNT", "FREQUENCY", "LAST", "NEXT", "SEEN", "CONF"
    );
    println!("{}", "-".repeat(94));
    for s in &suggestions {
        println!(
            "{:<28}  {:>10.2}  {:<10}  {:<10}  {:<10}  {:>5}  {:>5.2}",
            truncate(&s.vendor, 28),
            s.amount,
            s.frequency,
            s.last_date,
            s.next_date,
            s.occurrences,
            s.confidence
        );
    }
    Ok(())
}

/// Parse all files, clean vendor names and detect recurring charges
pub fn find_recurring(
    files: &[PathBuf],
    format: Option<&str>,
    as_of: NaiveDate,
    tracked: &[String],
    rules: Option<&Path>,
) -> Result<Vec<RecurringSuggestion>> {
    let classifier = Classifier::new(load_rules(rules)?);

    let mut history = Vec::new();
    for file in files {
        let account = file.display().to_string();
        let (_, transactions) = read_transactions(file, format, &account)?;
        history.extend(classifier.classify_all(&transactions));
    }

    let detector = RecurringDetector::with_config(classifier.config().recurring.clone());
    Ok(detector.detect(&history, tracked, as_of))
}

fn parse_as_of(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid --as-of date (expected YYYY-MM-DD): {}", s)),
        None => Ok(Local::now().date_naive()),
    }
}
