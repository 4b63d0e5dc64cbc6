//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clearbook_core::{Frequency, TransactionType, UNCATEGORIZED};
use tempfile::{tempdir, TempDir};

use crate::commands::{self, truncate};

const CHASE_CSV: &str = "Transaction Date,Post Date,Description,Category,Type,Amount,Memo
01/05/2024,01/06/2024,NETFLIX.COM,Entertainment,Sale,-15.49,
02/05/2024,02/06/2024,NETFLIX.COM,Entertainment,Sale,-15.49,
03/05/2024,03/06/2024,NETFLIX.COM,Entertainment,Sale,-15.49,
02/14/2024,02/15/2024,STARBUCKS STORE 1234,Food & Drink,Sale,-6.45,
02/28/2024,02/28/2024,ACME PAYROLL,,ACH_CREDIT,2500.00,
";

const RULES_TOML: &str = r#"
[[category_rules]]
keyword = "NETFLIX"
category = "Movies"

[[vendor_rules]]
keyword = "NETFLIX"
vendor = "Netflix Inc"
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly ten", 11), "exactly ten");
    assert_eq!(truncate("this is a long description", 10), "this is...");
    assert_eq!(truncate("café au lait", 7), "café...");
}

#[test]
fn test_load_rules_defaults_to_builtin() {
    let config = commands::load_rules(None).unwrap();
    assert!(!config.category_rules.is_empty());
}

#[test]
fn test_load_rules_from_explicit_path() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "rules.toml", RULES_TOML);
    let config = commands::load_rules(Some(&path)).unwrap();
    assert_eq!(config.category_rules.len(), 1);
    assert_eq!(config.vendor_rules[0].vendor, "Netflix Inc");
}

#[test]
fn test_load_rules_missing_explicit_path_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = commands::load_rules(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Failed to read rules file"));
}

#[test]
fn test_load_rules_invalid_toml_fails() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "rules.toml", "category_rules = 7");
    assert!(commands::load_rules(Some(&path)).is_err());
}

// ========== Parser Resolution Tests ==========

#[test]
fn test_resolve_parser_auto_detects_chase() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "chase.csv", CHASE_CSV);
    let parser = commands::resolve_parser(&path, None).unwrap();
    assert_eq!(parser.id(), "chase");
}

#[test]
fn test_resolve_parser_falls_back_to_universal() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "bank.csv",
        "Posting Date,Payee,Withdrawal,Deposit\n2024-01-02,CORNER STORE,4.50,\n",
    );
    let parser = commands::resolve_parser(&path, None).unwrap();
    assert_eq!(parser.id(), "universal");
}

#[test]
fn test_resolve_parser_explicit_format() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "chase.csv", CHASE_CSV);
    assert_eq!(
        commands::resolve_parser(&path, Some("Generic")).unwrap().id(),
        "universal"
    );
    let err = commands::resolve_parser(&path, Some("monzo")).unwrap_err();
    assert!(err.to_string().contains("Unknown bank format: monzo"));
}

// ========== Import Command Tests ==========

#[test]
fn test_import_file_with_builtin_rules() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "chase.csv", CHASE_CSV);

    let transactions = commands::import_file(&path, None, Some("Sapphire"), None).unwrap();
    assert_eq!(transactions.len(), 5);

    assert_eq!(transactions[0].vendor_name.as_deref(), Some("Netflix"));
    assert_eq!(transactions[0].category.as_deref(), Some("Streaming"));
    assert_eq!(transactions[3].vendor_name.as_deref(), Some("Starbucks"));
    assert_eq!(transactions[3].category.as_deref(), Some("Coffee"));

    let payroll = &transactions[4];
    assert_eq!(payroll.tx_type, TransactionType::Income);
    assert_eq!(payroll.category.as_deref(), Some(UNCATEGORIZED));
    assert_eq!(payroll.vendor_name, None);
}

#[test]
fn test_import_file_with_custom_rules() {
    let dir = tempdir().unwrap();
    let csv = write_file(&dir, "chase.csv", CHASE_CSV);
    let rules = write_file(&dir, "rules.toml", RULES_TOML);

    let transactions = commands::import_file(&csv, Some("chase"), None, Some(&rules)).unwrap();
    assert_eq!(transactions[0].category.as_deref(), Some("Movies"));
    assert_eq!(transactions[0].vendor_name.as_deref(), Some("Netflix Inc"));
    // Starbucks has no rule in the custom file
    assert_eq!(transactions[3].category.as_deref(), Some(UNCATEGORIZED));
}

#[test]
fn test_import_missing_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let err = commands::import_file(&missing, None, None, None).unwrap_err();
    assert!(err.to_string().contains("Failed to open file"));
}

#[test]
fn test_import_unrecognized_layout() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "odd.csv", "When,What,How Much\n2024-01-01,Coffee,3.00\n");
    let err = commands::import_file(&path, None, None, None).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("Unrecognized universal schema"), "{}", chain);
}

#[test]
fn test_import_windows_1252_export() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("amex.csv");
    let mut bytes = b"Date,Description,Amount\n01/15/2024,NETFLIX.COM,15.49\n".to_vec();
    bytes.extend_from_slice(b"01/16/2024,CAF\xe9 ROUGE,4.50\n");
    fs::write(&path, bytes).unwrap();

    let transactions = commands::import_file(&path, None, None, None).unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].import_format, "amex");
    assert!(transactions[1].original_vendor.starts_with("CAF"));
}

#[test]
fn test_cmd_import_json() {
    let dir = tempdir().unwrap();
    let path = write_file(&dir, "chase.csv", CHASE_CSV);
    assert!(commands::cmd_import(&path, None, None, None, true).is_ok());
    assert!(commands::cmd_import(&path, None, None, None, false).is_ok());
}

// ========== Categorize Command Tests ==========

#[test]
fn test_categorize_description() {
    let (category, vendor) =
        commands::categorize_description("AMAZON MKTPLACE PMTS AMZN.COM/BILL", None).unwrap();
    assert_eq!(category, "Online Shopping");
    assert_eq!(vendor.as_deref(), Some("Amazon Marketplace"));

    let (category, vendor) = commands::categorize_description("LOCAL DINER", None).unwrap();
    assert_eq!(category, UNCATEGORIZED);
    assert_eq!(vendor, None);
}

#[test]
fn test_cmd_categorize() {
    assert!(commands::cmd_categorize("UBER EATS ORDER", None).is_ok());
}

// ========== Recurring Command Tests ==========

#[test]
fn test_find_recurring_across_files() {
    let dir = tempdir().unwrap();
    let chase = write_file(&dir, "chase.csv", CHASE_CSV);
    let bofa = write_file(
        &dir,
        "bofa.csv",
        "Date,Description,Amount,Running Bal.
01/10/2024,PLANET FITNESS CLUB,-24.99,1000.00
02/09/2024,PLANET FITNESS CLUB,-24.99,975.01
03/10/2024,PLANET FITNESS CLUB,-24.99,950.02
",
    );

    let suggestions = commands::find_recurring(
        &[chase, bofa],
        None,
        date(2024, 3, 31),
        &[],
        None,
    )
    .unwrap();

    let vendors: Vec<_> = suggestions.iter().map(|s| s.vendor.as_str()).collect();
    assert_eq!(vendors, vec!["Netflix", "Planet Fitness"]);
    assert!(suggestions.iter().all(|s| s.frequency == Frequency::Monthly));
    assert_eq!(suggestions[0].next_date, date(2024, 4, 5));
    assert_eq!(suggestions[1].next_date, date(2024, 4, 10));
}

#[test]
fn test_find_recurring_respects_tracked() {
    let dir = tempdir().unwrap();
    let chase = write_file(&dir, "chase.csv", CHASE_CSV);

    let tracked = vec!["Netflix".to_string()];
    let suggestions =
        commands::find_recurring(&[chase], None, date(2024, 3, 31), &tracked, None).unwrap();
    assert!(suggestions.is_empty());
}

#[test]
fn test_cmd_recurring_rejects_bad_date() {
    let dir = tempdir().unwrap();
    let chase = write_file(&dir, "chase.csv", CHASE_CSV);
    let err = commands::cmd_recurring(&[chase], None, Some("03/31/2024"), &[], None, false)
        .unwrap_err();
    assert!(err.to_string().contains("Invalid --as-of date"));
}

#[test]
fn test_cmd_recurring_output() {
    let dir = tempdir().unwrap();
    let chase = write_file(&dir, "chase.csv", CHASE_CSV);
    let files = [chase];
    assert!(commands::cmd_recurring(&files, None, Some("2024-03-31"), &[], None, false).is_ok());
    assert!(commands::cmd_recurring(&files, None, Some("2024-03-31"), &[], None, true).is_ok());
}

// ========== Formats Command Tests ==========

#[test]
fn test_cmd_formats() {
    assert!(commands::cmd_formats().is_ok());
}

#[test]
fn test_aliases() {
    assert_eq!(commands::aliases("capital_one"), vec!["capitalone"]);
    assert_eq!(commands::aliases("chase"), Vec::<&str>::new());
    assert_eq!(commands::aliases("universal"), vec!["generic"]);
}
