//! CSV import for bank transaction exports
//!
//! Known bank layouts are described as data in [`formats`]; anything else goes
//! through the header-sniffing parser in [`universal`]. Both produce the same
//! canonical [`Transaction`] through a lazy [`TransactionStream`].
//!
//! Failure semantics:
//! - An unknown format id or an unusable header fails before any row is read.
//! - A row whose date or amount cannot be parsed is logged and skipped.
//! - Text that is not valid UTF-8 (e.g. Windows-1252 exports) is decoded
//!   lossily rather than failing the row.
//! - A read failure on the underlying stream ends the batch with an error.

pub mod formats;
pub mod universal;

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ByteRecordsIntoIter, ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType};

pub use formats::{AmountColumns, FormatSpec, SignConvention, FORMATS};
pub use universal::UniversalColumns;

/// Identifiers accepted for the heuristic parser
pub const UNIVERSAL_IDS: &[&str] = &["universal", "generic"];

/// A parser selected from the registry
#[derive(Debug, Clone, Copy)]
pub enum Parser {
    /// Bank with a fixed, known header layout
    Fixed(&'static FormatSpec),
    /// Header-pattern detection for unrecognized layouts
    Universal,
}

impl Parser {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Fixed(spec) => spec.id(),
            Self::Universal => UNIVERSAL_IDS[0],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed(spec) => spec.name,
            Self::Universal => "Universal (header detection)",
        }
    }

    /// Start parsing a CSV stream
    ///
    /// The header row is read and validated immediately, so schema problems
    /// surface here; data rows are only read as the returned stream is
    /// iterated. `account` is carried into log events for skipped rows.
    pub fn parse<R: Read>(&self, account: &str, reader: R) -> Result<TransactionStream<R>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = StringRecord::from_byte_record_lossy(rdr.byte_headers()?.clone());
        let layout = match self {
            Self::Fixed(spec) => RowLayout::Fixed(spec.resolve_columns(&headers)?),
            Self::Universal => RowLayout::Universal(UniversalColumns::identify(&headers)?),
        };

        info!(
            account = %account,
            format = self.id(),
            columns = headers.len(),
            "Parsing CSV"
        );

        Ok(TransactionStream {
            records: rdr.into_byte_records(),
            layout,
            format_id: self.id(),
            account: account.to_string(),
            finished: false,
        })
    }

    /// Parse a whole stream into memory
    ///
    /// Rows already produced are discarded if the stream fails part way, so
    /// callers see either every parseable row or a single error.
    pub fn parse_all<R: Read>(&self, account: &str, reader: R) -> Result<Vec<Transaction>> {
        let transactions = self
            .parse(account, reader)?
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "Parsed {} {} transactions",
            transactions.len(),
            self.id()
        );
        Ok(transactions)
    }
}

/// Look up a parser by bank identifier
///
/// Matching is case-insensitive but otherwise exact; there is no partial or
/// fuzzy fallback.
pub fn select_parser(bank_id: &str) -> Result<Parser> {
    let wanted = bank_id.trim();

    if let Some(spec) = FORMATS.iter().find(|spec| spec.matches(wanted)) {
        return Ok(Parser::Fixed(spec));
    }

    if UNIVERSAL_IDS.iter().any(|id| id.eq_ignore_ascii_case(wanted)) {
        return Ok(Parser::Universal);
    }

    Err(Error::UnknownBankFormat(bank_id.to_string()))
}

/// Every registered parser, fixed formats first
pub fn parsers() -> Vec<Parser> {
    FORMATS
        .iter()
        .map(Parser::Fixed)
        .chain(std::iter::once(Parser::Universal))
        .collect()
}

/// Detect a fixed bank format from a CSV header line
///
/// Returns the format id, or None when the layout is not one of the known
/// banks (callers then fall back to the universal parser).
pub fn detect_format(header_line: &str) -> Option<&'static str> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(header_line.trim().as_bytes());
    let record = rdr.records().next()?.ok()?;
    let headers = HeaderIndex::new(&record);

    // Capital One: "Transaction Date,Posted Date,Card No.,..."
    // Note: "Posted" with 'ed' distinguishes from Chase's "Post Date"
    if headers.has_all(&["transaction date", "posted date", "card no.", "debit", "credit"]) {
        return Some("capital_one");
    }

    // Chase: "Transaction Date,Post Date,Description,Category,Type,Amount,Memo"
    if headers.has_all(&["transaction date", "post date", "description", "type", "amount"]) {
        return Some("chase");
    }

    // Amex extended: "Date,Description,Card Member,Account #,Amount,..."
    if headers.has_all(&["date", "description", "card member", "amount"]) {
        return Some("amex");
    }

    // BofA and Amex simple both start with "Date,Description,Amount";
    // BofA carries a running balance, Amex simple has exactly 3 columns
    if headers.has_all(&["date", "description", "amount"]) {
        if headers.has_all(&["running bal."]) {
            return Some("bofa");
        }
        if record.len() == 3 {
            return Some("amex");
        }
    }

    None
}

/// Case-insensitive header name to column index lookup
#[derive(Debug, Clone)]
pub(crate) struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &StringRecord) -> Self {
        let mut columns = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers
            columns
                .entry(normalize_header(header))
                .or_insert(i);
        }
        Self { columns }
    }

    pub(crate) fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(&normalize_header(name)).copied()
    }

    fn has_all(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.get(name).is_some())
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').to_lowercase()
}

/// Column resolution for the active parser
#[derive(Debug, Clone)]
enum RowLayout {
    Fixed(formats::FixedColumns),
    Universal(UniversalColumns),
}

impl RowLayout {
    fn read_row(&self, record: &StringRecord) -> std::result::Result<Option<ParsedRow>, String> {
        match self {
            Self::Fixed(columns) => columns.read_row(record).map(Some),
            Self::Universal(columns) => columns.read_row(record),
        }
    }
}

/// Fields extracted from one CSV row before normalization
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedRow {
    pub date: NaiveDate,
    pub post_date: Option<NaiveDate>,
    pub description: String,
    pub bank_category: Option<String>,
    pub amount: f64,
    pub tx_type: TransactionType,
}

impl ParsedRow {
    fn into_transaction(self, format_id: &str) -> Transaction {
        let amount = round_cents(self.amount.abs());
        let signed = match self.tx_type {
            TransactionType::Expense => -amount,
            _ => amount,
        };
        let import_hash = generate_hash(&self.date, &self.description, signed, format_id);

        let description = match &self.bank_category {
            Some(category) => format!("{} ({})", self.description, category),
            None => self.description.clone(),
        };

        Transaction {
            date: self.date,
            post_date: self.post_date,
            description,
            original_vendor: self.description,
            amount,
            tx_type: self.tx_type,
            vendor_name: None,
            category: None,
            import_hash,
            import_format: format_id.to_string(),
        }
    }
}

/// Lazy sequence of transactions from one CSV stream
///
/// Yields `Ok` for every parseable row. Unparseable rows are logged and
/// skipped. A read failure yields one `Err(Error::StreamRead)` and ends the
/// stream. The underlying reader is consumed; a fresh reader is needed to
/// parse again.
pub struct TransactionStream<R> {
    records: ByteRecordsIntoIter<R>,
    layout: RowLayout,
    format_id: &'static str,
    account: String,
    finished: bool,
}

impl<R> TransactionStream<R> {
    pub fn format_id(&self) -> &'static str {
        self.format_id
    }
}

impl<R: Read> Iterator for TransactionStream<R> {
    type Item = Result<Transaction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let record = match self.records.next() {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(Error::StreamRead(e)));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };

            // Blank lines come through as a single empty field
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            // Lossy conversion drops the position, so take it first
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if std::str::from_utf8(record.as_slice()).is_err() {
                debug!(
                    account = %self.account,
                    format = self.format_id,
                    line,
                    "Row is not valid UTF-8, decoding lossily"
                );
            }
            let record = StringRecord::from_byte_record_lossy(record);
            match self.layout.read_row(&record) {
                Ok(Some(row)) => return Some(Ok(row.into_transaction(self.format_id))),
                Ok(None) => {
                    debug!(
                        account = %self.account,
                        format = self.format_id,
                        line,
                        "Dropped row with zero debit and credit"
                    );
                }
                Err(reason) => {
                    let err = Error::RowParse { line, reason };
                    warn!(
                        account = %self.account,
                        format = self.format_id,
                        "Skipping row: {}",
                        err
                    );
                }
            }
        }
    }
}

/// Parse a date against an ordered list of formats; first match wins
pub(crate) fn parse_date(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    let s = s.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse an amount string, handling currency symbols, thousands separators and
/// accounting-style parentheses
pub(crate) fn parse_amount(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let (negative, inner) = if trimmed.starts_with('(') && trimmed.ends_with(')') {
        (true, &trimmed[1..trimmed.len() - 1])
    } else {
        (false, trimmed)
    };

    let cleaned: String = inner
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value.abs() } else { value })
}

/// Cell value by column, treating missing or blank cells as absent
pub(crate) fn cell(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|col| record.get(col))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generate a hash for deduplication of re-imported rows
fn generate_hash(date: &NaiveDate, description: &str, amount: f64, format_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(format_id.as_bytes());
    hex::encode(hasher.finalize())
}
