//! Universal CSV parser for banks without a registered format
//!
//! Column roles are identified from header names with case-insensitive
//! patterns. Each header is tested against the roles in a fixed precedence
//! order (transaction date, post date, description, amount, debit, credit);
//! the first role it matches claims it, and a header whose role is already
//! filled is ignored.

use csv::StringRecord;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::{cell, parse_amount, parse_date, ParsedRow};
use crate::error::{Error, Result};
use crate::models::TransactionType;

/// Date patterns tried for unrecognized layouts, in order
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2024-01-15
    "%m/%d/%y", // 01/15/24 (before %Y, which would read "24" as year 24)
    "%m/%d/%Y", // 01/15/2024
    "%d/%m/%Y", // 15/01/2024 (European)
    "%Y/%m/%d", // 2024/01/15
    "%m-%d-%Y", // 01-15-2024
    "%d.%m.%Y", // 15.01.2024
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    TransactionDate,
    PostDate,
    Description,
    Amount,
    Debit,
    Credit,
}

/// Header patterns in precedence order
const ROLE_PATTERNS: &[(Role, &str)] = &[
    (Role::TransactionDate, r"^((transaction|trans\.?|txn)[ _]?)?date$"),
    (Role::PostDate, r"^post(ed|ing)?[ _]?date$"),
    (Role::Description, r"description|payee|merchant|narrative|details|memo"),
    (Role::Amount, r"^(transaction[ _]?)?(amount|amt)\b"),
    (Role::Debit, r"debit|withdrawal|money[ _]out|paid[ _]out"),
    (Role::Credit, r"credit|deposit|money[ _]in|paid[ _]in"),
];

/// Column positions identified from a header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniversalColumns {
    pub date: Option<usize>,
    pub post_date: Option<usize>,
    pub description: Option<usize>,
    pub amount: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
}

impl UniversalColumns {
    /// Identify column roles and validate that the layout is usable
    ///
    /// Requires a date column, a description column, and either an amount
    /// column or both debit and credit columns. Fails with
    /// [`Error::UnrecognizedSchema`] listing what could not be found.
    pub fn identify(headers: &StringRecord) -> Result<Self> {
        let patterns = compile_patterns()?;
        let mut columns = Self::default();

        for (i, header) in headers.iter().enumerate() {
            let header = header.trim().trim_start_matches('\u{feff}');
            let Some(role) = patterns
                .iter()
                .find(|(_, re)| re.is_match(header))
                .map(|(role, _)| *role)
            else {
                continue;
            };

            let slot = columns.slot(role);
            if slot.is_none() {
                *slot = Some(i);
            }
        }

        if columns.date.is_none() && columns.post_date.is_some() {
            debug!("No transaction date column, using post date");
            columns.date = columns.post_date;
        }

        let missing = columns.missing_roles();
        if !missing.is_empty() {
            return Err(Error::UnrecognizedSchema {
                format: "universal".to_string(),
                missing,
            });
        }

        debug!(?columns, "Identified universal CSV columns");
        Ok(columns)
    }

    fn slot(&mut self, role: Role) -> &mut Option<usize> {
        match role {
            Role::TransactionDate => &mut self.date,
            Role::PostDate => &mut self.post_date,
            Role::Description => &mut self.description,
            Role::Amount => &mut self.amount,
            Role::Debit => &mut self.debit,
            Role::Credit => &mut self.credit,
        }
    }

    fn missing_roles(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date".to_string());
        }
        if self.description.is_none() {
            missing.push("description".to_string());
        }
        if self.amount.is_none() && (self.debit.is_none() || self.credit.is_none()) {
            missing.push("amount (or debit and credit)".to_string());
        }
        missing
    }

    /// Read one row
    ///
    /// Returns `Ok(None)` for rows whose debit and credit cells hold only
    /// zeros, which are pending or authorization-hold artifacts rather than
    /// transactions.
    pub(crate) fn read_row(
        &self,
        record: &StringRecord,
    ) -> std::result::Result<Option<ParsedRow>, String> {
        let date_str = cell(record, self.date).ok_or("Missing date")?;
        let date = parse_date(date_str, DATE_FORMATS)
            .ok_or_else(|| format!("Unable to parse date: {}", date_str))?;

        let post_date = if self.post_date == self.date {
            None
        } else {
            cell(record, self.post_date).and_then(|s| parse_date(s, DATE_FORMATS))
        };

        let description = cell(record, self.description)
            .unwrap_or_default()
            .to_string();

        let Some((amount, tx_type)) = self.resolve_amount(record)? else {
            return Ok(None);
        };

        Ok(Some(ParsedRow {
            date,
            post_date,
            description,
            bank_category: None,
            amount,
            tx_type,
        }))
    }

    fn resolve_amount(
        &self,
        record: &StringRecord,
    ) -> std::result::Result<Option<(f64, TransactionType)>, String> {
        let debit = amount_cell(record, self.debit)?;
        let credit = amount_cell(record, self.credit)?;
        let amount = amount_cell(record, self.amount)?;

        match (debit, credit, amount) {
            // Both sides present: a nonzero debit wins
            (Some(debit), Some(credit), _) => {
                if debit != 0.0 {
                    Ok(Some((debit.abs(), TransactionType::Expense)))
                } else if credit != 0.0 {
                    Ok(Some((credit.abs(), TransactionType::Income)))
                } else {
                    Ok(None)
                }
            }
            (_, _, Some(value)) if value < 0.0 => Ok(Some((value.abs(), TransactionType::Expense))),
            (_, _, Some(value)) => Ok(Some((value, TransactionType::Income))),
            // A lone zero is the same pending artifact as a zero pair
            (Some(value), None, None) | (None, Some(value), None) if value == 0.0 => Ok(None),
            (Some(debit), None, None) => Ok(Some((debit.abs(), TransactionType::Expense))),
            (None, Some(credit), None) => Ok(Some((credit.abs(), TransactionType::Income))),
            (None, None, None) => Err("Missing amount".to_string()),
        }
    }
}

fn amount_cell(
    record: &StringRecord,
    column: Option<usize>,
) -> std::result::Result<Option<f64>, String> {
    cell(record, column)
        .map(|raw| parse_amount(raw).ok_or_else(|| format!("Unable to parse amount: {}", raw)))
        .transpose()
}

fn compile_patterns() -> Result<Vec<(Role, Regex)>> {
    ROLE_PATTERNS
        .iter()
        .map(|(role, pattern)| {
            let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
            Ok((*role, re))
        })
        .collect()
}
