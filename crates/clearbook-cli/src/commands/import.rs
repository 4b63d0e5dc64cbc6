//! CSV import command

use std::path::Path;

use anyhow::Result;
use clearbook_core::{Transaction, UNCATEGORIZED};

use super::{load_rules, read_transactions, truncate, Classifier};

pub fn cmd_import(
    file: &Path,
    format: Option<&str>,
    account: Option<&str>,
    rules: Option<&Path>,
    json: bool,
) -> Result<()> {
    let transactions = import_file(file, format, account, rules)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    print_transactions(&transactions);
    Ok(())
}

/// Parse a file and classify every transaction with the configured rules
pub fn import_file(
    file: &Path,
    format: Option<&str>,
    account: Option<&str>,
    rules: Option<&Path>,
) -> Result<Vec<Transaction>> {
    let classifier = Classifier::new(load_rules(rules)?);
    let account = account
        .map(str::to_string)
        .unwrap_or_else(|| file.display().to_string());

    let (parser, transactions) = read_transactions(file, format, &account)?;
    tracing::info!(
        "Imported {} transactions from {} using {}",
        transactions.len(),
        file.display(),
        parser.name()
    );

    Ok(classifier.classify_all(&transactions))
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<10}  {:<32}  {:<20}  {:<18}  {:>10}",
        "DATE", "DESCRIPTION", "VENDOR", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(98));

    for tx in transactions {
        println!(
            "{:<10}  {:<32}  {:<20}  {:<18}  {:>10.2}",
            tx.date,
            truncate(&tx.description, 32),
            truncate(tx.vendor_name.as_deref().unwrap_or("-"), 20),
            truncate(tx.category.as_deref().unwrap_or(UNCATEGORIZED), 18),
            tx.signed_amount()
        );
    }

    let uncategorized = transactions
        .iter()
        .filter(|tx| tx.category.as_deref() == Some(UNCATEGORIZED))
        .count();
    let (income, expenses) = transactions.iter().fold((0.0, 0.0), |(inc, exp), tx| {
        let signed = tx.signed_amount();
        if signed >= 0.0 {
            (inc + signed, exp)
        } else {
            (inc, exp - signed)
        }
    });

    println!();
    println!("   Transactions:  {}", transactions.len());
    println!("   Uncategorized: {}", uncategorized);
    println!("   Income:        ${:.2}", income);
    println!("   Expenses:      ${:.2}", expenses);
}
