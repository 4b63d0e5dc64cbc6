//! Rule preview command

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use clearbook_core::{Transaction, TransactionType};

use super::{load_rules, Classifier};

pub fn cmd_categorize(description: &str, rules: Option<&Path>) -> Result<()> {
    let (category, vendor) = categorize_description(description, rules)?;

    println!("Description: {}", description);
    println!("Category:    {}", category);
    println!("Vendor:      {}", vendor.as_deref().unwrap_or("(no match)"));
    Ok(())
}

/// Category and cleaned vendor the rules assign to a bare description
pub fn categorize_description(
    description: &str,
    rules: Option<&Path>,
) -> Result<(String, Option<String>)> {
    let classifier = Classifier::new(load_rules(rules)?);

    let tx = Transaction {
        date: Local::now().date_naive(),
        post_date: None,
        description: description.to_string(),
        original_vendor: description.to_string(),
        amount: 0.0,
        tx_type: TransactionType::Expense,
        vendor_name: None,
        category: None,
        import_hash: String::new(),
        import_format: String::new(),
    };

    let classified = classifier.classify(&tx);
    Ok((
        classified.category.unwrap_or_default(),
        classified.vendor_name,
    ))
}
