//! Fixed-schema bank formats
//!
//! Each bank is a [`FormatSpec`]: the header names it uses, the date patterns
//! it emits and how its amounts encode direction. Columns are looked up by
//! exact (case-insensitive) header name, so reordered columns are fine but a
//! renamed header is not.

use csv::StringRecord;

use super::{cell, parse_amount, parse_date, HeaderIndex, ParsedRow};
use crate::error::{Error, Result};
use crate::models::TransactionType;

/// How a single signed amount column encodes direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignConvention {
    /// Charges are positive, payments and refunds negative (Amex)
    PositiveIsExpense,
    /// Charges are negative, deposits and refunds positive (Chase, BofA)
    NegativeIsExpense,
}

/// Where a format keeps its amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed column
    Signed {
        column: &'static str,
        convention: SignConvention,
    },
    /// Separate debit and credit columns, both reported as non-negative
    DebitCredit {
        debit: &'static str,
        credit: &'static str,
    },
}

/// Layout quirks of one bank export
#[derive(Debug)]
pub struct FormatSpec {
    /// Canonical identifier (first entry is used for display and hashing)
    pub ids: &'static [&'static str],
    pub name: &'static str,
    pub date_column: &'static str,
    pub post_date_column: Option<&'static str>,
    pub description_column: &'static str,
    /// Bank-supplied category, appended to the description when present
    pub category_column: Option<&'static str>,
    pub amount: AmountColumns,
    /// Candidate date patterns, tried in order. Two-digit years go first:
    /// `%Y` also accepts "25" and would read it as year 25.
    pub date_formats: &'static [&'static str],
}

/// Registered bank formats
pub static FORMATS: &[FormatSpec] = &[
    // Transaction Date,Posted Date,Card No.,Description,Category,Debit,Credit
    FormatSpec {
        ids: &["capital_one", "capitalone"],
        name: "Capital One",
        date_column: "Transaction Date",
        post_date_column: Some("Posted Date"),
        description_column: "Description",
        category_column: Some("Category"),
        amount: AmountColumns::DebitCredit {
            debit: "Debit",
            credit: "Credit",
        },
        date_formats: &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"],
    },
    // Date,Description,Amount (simple) or the 13-column extended export,
    // which adds Card Member, Reference, Category, ...
    FormatSpec {
        ids: &["amex"],
        name: "American Express",
        date_column: "Date",
        post_date_column: None,
        description_column: "Description",
        category_column: Some("Category"),
        amount: AmountColumns::Signed {
            column: "Amount",
            convention: SignConvention::PositiveIsExpense,
        },
        date_formats: &["%m/%d/%y", "%m/%d/%Y"],
    },
    // Transaction Date,Post Date,Description,Category,Type,Amount,Memo
    FormatSpec {
        ids: &["chase"],
        name: "Chase",
        date_column: "Transaction Date",
        post_date_column: Some("Post Date"),
        description_column: "Description",
        category_column: Some("Category"),
        amount: AmountColumns::Signed {
            column: "Amount",
            convention: SignConvention::NegativeIsExpense,
        },
        date_formats: &["%m/%d/%y", "%m/%d/%Y"],
    },
    // Date,Description,Amount,Running Bal.
    FormatSpec {
        ids: &["bofa", "bank_of_america"],
        name: "Bank of America",
        date_column: "Date",
        post_date_column: None,
        description_column: "Description",
        category_column: None,
        amount: AmountColumns::Signed {
            column: "Amount",
            convention: SignConvention::NegativeIsExpense,
        },
        date_formats: &["%m/%d/%Y"],
    },
];

impl FormatSpec {
    pub fn id(&self) -> &'static str {
        self.ids[0]
    }

    pub fn matches(&self, bank_id: &str) -> bool {
        self.ids.iter().any(|id| id.eq_ignore_ascii_case(bank_id))
    }

    /// Resolve header names to column indices
    ///
    /// Date, description and amount columns are required; post date and
    /// category are used when present.
    pub(crate) fn resolve_columns(&'static self, headers: &StringRecord) -> Result<FixedColumns> {
        let index = HeaderIndex::new(headers);
        let mut missing = Vec::new();

        let mut require = |name: &'static str| {
            let col = index.get(name);
            if col.is_none() {
                missing.push(name.to_string());
            }
            col
        };

        let date = require(self.date_column);
        let description = require(self.description_column);
        let amount = match self.amount {
            AmountColumns::Signed { column, convention } => {
                require(column).map(|col| ResolvedAmount::Signed { col, convention })
            }
            AmountColumns::DebitCredit { debit, credit } => {
                match (require(debit), require(credit)) {
                    (Some(debit), Some(credit)) => Some(ResolvedAmount::DebitCredit { debit, credit }),
                    _ => None,
                }
            }
        };

        match (date, description, amount) {
            (Some(date), Some(description), Some(amount)) => Ok(FixedColumns {
                spec: self,
                date,
                post_date: self.post_date_column.and_then(|name| index.get(name)),
                description,
                category: self.category_column.and_then(|name| index.get(name)),
                amount,
            }),
            _ => Err(Error::UnrecognizedSchema {
                format: self.id().to_string(),
                missing,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ResolvedAmount {
    Signed {
        col: usize,
        convention: SignConvention,
    },
    DebitCredit {
        debit: usize,
        credit: usize,
    },
}

/// A [`FormatSpec`] bound to the column positions of one file
#[derive(Debug, Clone)]
pub(crate) struct FixedColumns {
    spec: &'static FormatSpec,
    date: usize,
    post_date: Option<usize>,
    description: usize,
    category: Option<usize>,
    amount: ResolvedAmount,
}

impl FixedColumns {
    pub(crate) fn read_row(&self, record: &StringRecord) -> std::result::Result<ParsedRow, String> {
        let date_str = cell(record, Some(self.date)).ok_or("Missing date")?;
        let date = parse_date(date_str, self.spec.date_formats)
            .ok_or_else(|| format!("Unable to parse date: {}", date_str))?;

        // A bad post date is not worth losing the row over
        let post_date =
            cell(record, self.post_date).and_then(|s| parse_date(s, self.spec.date_formats));

        let description = record
            .get(self.description)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let bank_category = cell(record, self.category).map(str::to_string);

        let (amount, tx_type) = match self.amount {
            ResolvedAmount::Signed { col, convention } => {
                let raw = cell(record, Some(col)).ok_or("Missing amount")?;
                let value =
                    parse_amount(raw).ok_or_else(|| format!("Unable to parse amount: {}", raw))?;
                signed_amount(value, convention)
            }
            ResolvedAmount::DebitCredit { debit, credit } => {
                let debit = optional_amount(record, debit)?;
                let credit = optional_amount(record, credit)?;
                if debit.is_none() && credit.is_none() {
                    return Err("Missing debit and credit".to_string());
                }
                net_amount(debit.unwrap_or(0.0), credit.unwrap_or(0.0))
            }
        };

        Ok(ParsedRow {
            date,
            post_date,
            description,
            bank_category,
            amount,
            tx_type,
        })
    }
}

fn optional_amount(record: &StringRecord, col: usize) -> std::result::Result<Option<f64>, String> {
    cell(record, Some(col))
        .map(|raw| parse_amount(raw).ok_or_else(|| format!("Unable to parse amount: {}", raw)))
        .transpose()
}

/// Direction of a single signed amount under a bank's convention
fn signed_amount(value: f64, convention: SignConvention) -> (f64, TransactionType) {
    match convention {
        SignConvention::PositiveIsExpense if value > 0.0 => (value, TransactionType::Expense),
        SignConvention::PositiveIsExpense => (value.abs(), TransactionType::Income),
        SignConvention::NegativeIsExpense if value < 0.0 => (value.abs(), TransactionType::Expense),
        SignConvention::NegativeIsExpense => (value, TransactionType::Income),
    }
}

/// Net of a debit/credit pair: credit minus debit, non-negative is income
fn net_amount(debit: f64, credit: f64) -> (f64, TransactionType) {
    let net = credit - debit;
    if net >= 0.0 {
        (net, TransactionType::Income)
    } else {
        (net.abs(), TransactionType::Expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::select_parser;
    use crate::models::Transaction;
    use chrono::NaiveDate;

    fn parse(bank: &str, csv: &str) -> Vec<Transaction> {
        select_parser(bank)
            .unwrap()
            .parse_all("test-account", csv.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_parse_capitalone_debit() {
        let csv = "Transaction Date,Posted Date,Card No.,Description,Category,Debit,Credit
2024-01-15,2024-01-16,1234,STARBUCKS STORE 123,Dining,7.53,";

        let txs = parse("capital_one", csv);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 7.53);
        assert_eq!(txs[0].tx_type, TransactionType::Expense);
        assert_eq!(txs[0].description, "STARBUCKS STORE 123 (Dining)");
        assert_eq!(txs[0].original_vendor, "STARBUCKS STORE 123");
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(txs[0].post_date, NaiveDate::from_ymd_opt(2024, 1, 16));
    }

    #[test]
    fn test_parse_capitalone_credit_and_net() {
        let csv = "Transaction Date,Posted Date,Card No.,Description,Category,Debit,Credit
01/20/2024,01/21/2024,1234,CAPITAL ONE MOBILE PYMT,Payment/Credit,,250.00
01/21/2024,01/22/2024,1234,ADJUSTED CHARGE,Other,10.00,4.00
01/22/2024,01/23/2024,1234,NO AMOUNT,Other,,";

        let txs = parse("capitalone", csv);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].tx_type, TransactionType::Income);
        assert_eq!(txs[0].amount, 250.0);
        assert_eq!(txs[1].tx_type, TransactionType::Expense);
        assert_eq!(txs[1].amount, 6.0);
    }

    #[test]
    fn test_parse_capitalone_reordered_columns() {
        let csv = "Credit,Debit,Description,Transaction Date,Posted Date,Category,Card No.
,12.00,SHELL OIL,2024-02-01,2024-02-02,Gas/Automotive,1234";

        let txs = parse("capital_one", csv);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 12.0);
        assert_eq!(txs[0].description, "SHELL OIL (Gas/Automotive)");
    }

    #[test]
    fn test_parse_amex() {
        let csv = "Date,Description,Amount
01/15/2024,AMAZON.COM,99.99
01/14/2024,PAYMENT RECEIVED,-843";

        let txs = parse("amex", csv);
        assert_eq!(txs.len(), 2);
        // Amex: positive charges are expenses
        assert_eq!(txs[0].tx_type, TransactionType::Expense);
        assert_eq!(txs[0].amount, 99.99);
        // Negative amounts are payments/credits
        assert_eq!(txs[1].tx_type, TransactionType::Income);
        assert_eq!(txs[1].amount, 843.0);
        assert_eq!(txs[1].description, "PAYMENT RECEIVED");
    }

    #[test]
    fn test_parse_amex_extended_appends_category() {
        let csv = r#"Date,Description,Card Member,Account #,Amount,Extended Details,Appears On Your Statement As,Address,City/State,Zip Code,Country,Reference,Category
01/06/25,H-E-B #123,JANE DOE,-12345,87.43,"","H-E-B #123","123 MAIN ST","AUSTIN, TX",78701,UNITED STATES,987654321,Merchandise & Supplies-Groceries"#;

        let txs = parse("amex", csv);
        assert_eq!(txs.len(), 1);
        assert_eq!(
            txs[0].description,
            "H-E-B #123 (Merchandise & Supplies-Groceries)"
        );
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(txs[0].amount, 87.43);
    }

    #[test]
    fn test_parse_chase() {
        let csv = "Transaction Date,Post Date,Description,Category,Type,Amount,Memo
01/15/2024,01/16/2024,NETFLIX.COM,Entertainment,Sale,-15.99,
01/14/2024,01/15/2024,REFUND AMAZON,Shopping,Return,25.00,";

        let txs = parse("chase", csv);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].description, "NETFLIX.COM (Entertainment)");
        assert_eq!(txs[0].amount, 15.99);
        assert_eq!(txs[0].tx_type, TransactionType::Expense);
        assert_eq!(txs[1].tx_type, TransactionType::Income);
        assert_eq!(txs[1].amount, 25.0);
    }

    #[test]
    fn test_parse_bofa() {
        let csv = "Date,Description,Amount,Running Bal.
01/02/2024,PAYROLL DEPOSIT,\"2,500.00\",\"3,100.00\"
01/03/2024,CITY WATER,(45.10),\"3,054.90\"";

        let txs = parse("bofa", csv);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].tx_type, TransactionType::Income);
        assert_eq!(txs[0].amount, 2500.0);
        assert_eq!(txs[1].tx_type, TransactionType::Expense);
        assert_eq!(txs[1].amount, 45.10);
        assert!(txs[1].category.is_none());
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "Transaction Date,Post Date,Description,Category,Type,Amount,Memo
01/15/2024,01/16/2024,NETFLIX.COM,Entertainment,Sale,-15.99,
not-a-date,01/16/2024,BROKEN DATE,,Sale,-1.00,
01/17/2024,01/18/2024,BROKEN AMOUNT,,Sale,abc,
01/18/2024,garbage,BAD POST DATE,,Sale,-2.00,";

        let txs = parse("chase", csv);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].original_vendor, "NETFLIX.COM");
        assert_eq!(txs[1].original_vendor, "BAD POST DATE");
        assert_eq!(txs[1].post_date, None);
    }

    #[test]
    fn test_renamed_header_is_unrecognized() {
        let csv = "Trans Date,Post Date,Description,Category,Type,Amount,Memo
01/15/2024,01/16/2024,NETFLIX.COM,Entertainment,Sale,-15.99,";

        let err = select_parser("chase")
            .unwrap()
            .parse("acct", csv.as_bytes())
            .err()
            .unwrap();
        match err {
            Error::UnrecognizedSchema { format, missing } => {
                assert_eq!(format, "chase");
                assert_eq!(missing, vec!["Transaction Date".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sign_conventions() {
        assert_eq!(
            signed_amount(10.0, SignConvention::PositiveIsExpense),
            (10.0, TransactionType::Expense)
        );
        assert_eq!(
            signed_amount(-10.0, SignConvention::PositiveIsExpense),
            (10.0, TransactionType::Income)
        );
        assert_eq!(
            signed_amount(-10.0, SignConvention::NegativeIsExpense),
            (10.0, TransactionType::Expense)
        );
        assert_eq!(
            signed_amount(0.0, SignConvention::NegativeIsExpense),
            (0.0, TransactionType::Income)
        );
        assert_eq!(net_amount(0.0, 0.0), (0.0, TransactionType::Income));
        assert_eq!(net_amount(7.53, 0.0), (7.53, TransactionType::Expense));
    }
}
