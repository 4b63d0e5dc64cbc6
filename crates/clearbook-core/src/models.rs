//! Data models for clearbook

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Semantic direction of a transaction
///
/// Amounts are always stored as magnitudes; the type carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    TransferIn,
    TransferOut,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical transaction produced by the importers
///
/// Created once per parsed row. Enrichment steps never mutate a transaction
/// in place; they return an updated copy (see [`Transaction::with_category`]
/// and [`Transaction::with_vendor`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub post_date: Option<NaiveDate>,
    /// Display description, suffixed with the bank category when one exists
    pub description: String,
    /// Raw description text exactly as the bank reported it
    pub original_vendor: String,
    /// Non-negative magnitude rounded to cents
    pub amount: f64,
    pub tx_type: TransactionType,
    pub vendor_name: Option<String>,
    pub category: Option<String>,
    /// SHA-256 of date, raw description, signed amount and format id
    pub import_hash: String,
    pub import_format: String,
}

impl Transaction {
    /// Return a copy with the category set
    pub fn with_category(&self, category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..self.clone()
        }
    }

    /// Return a copy with the cleaned vendor name set
    pub fn with_vendor(&self, vendor: impl Into<String>) -> Self {
        Self {
            vendor_name: Some(vendor.into()),
            ..self.clone()
        }
    }

    /// Cleaned vendor name if known, otherwise the raw description
    pub fn display_vendor(&self) -> &str {
        self.vendor_name
            .as_deref()
            .unwrap_or(self.original_vendor.as_str())
    }

    /// Amount with the sign implied by the transaction type
    pub fn signed_amount(&self) -> f64 {
        match self.tx_type {
            TransactionType::Expense | TransactionType::TransferOut => -self.amount,
            _ => self.amount,
        }
    }
}

/// Who a rule belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    #[default]
    Global,
    User(i64),
}

/// Keyword rule mapping a description substring to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub scope: RuleScope,
}

/// Keyword rule mapping a description substring to a canonical vendor name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRule {
    pub keyword: String,
    pub vendor: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub scope: RuleScope,
}

/// Entry in the category taxonomy
///
/// A category without a parent is a group (e.g. "Food"); only leaf
/// categories (e.g. "Groceries" under "Food") are assigned automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

impl Category {
    pub fn is_group(&self) -> bool {
        self.parent.is_none()
    }
}

/// Recurring billing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "WEEKLY",
            Self::BiWeekly => "BI_WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inferred periodic payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSuggestion {
    pub vendor: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub last_date: NaiveDate,
    pub next_date: NaiveDate,
    pub occurrences: usize,
    pub confidence: f64,
}
