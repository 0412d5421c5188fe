//! PDF Expected-Income Import Module
//!
//! Parses financial PDFs (invoices, statements, boletos) with no fixed
//! schema into expected-income candidates. Two strategies: structured
//! tables first, free-text currency patterns as fallback.

pub mod content;
pub mod table_strategy;
pub mod text_patterns;

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ImportError;

pub use content::{extract_content, PdfContent, Table};

/// Maximum length of `client_name`, matching the downstream column width.
pub const CLIENT_NAME_MAX: usize = 255;

/// One expected-income record inferred from a document, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIncomeCandidate {
    /// Best-effort label for the payer/source, at most 255 characters.
    pub client_name: String,
    /// Human-readable context for the extracted value.
    pub description: String,
    /// Minor currency unit; strictly positive for every emitted candidate.
    pub amount_cents: i64,
    /// Defaults to the extraction run's current date when none was found.
    pub expected_date: NaiveDate,
    /// Source fragment (row contents or matched substring), kept for audit.
    pub raw_text: String,
}

/// Parse a PDF file into expected-income candidates.
pub fn parse_pdf(pdf_path: &Path) -> Result<Vec<ParsedIncomeCandidate>, ImportError> {
    let content = extract_content(pdf_path)?;
    let today = Local::now().date_naive();
    let candidates = parse_income_values(&content, today);
    log::info!(
        "PDF import: {} table(s), {} candidate(s) from {}",
        content.tables.len(),
        candidates.len(),
        pdf_path.display()
    );
    Ok(candidates)
}

/// Run the extraction strategies over already-extracted content.
///
/// The table strategy runs over every detected table; the text-pattern
/// strategy runs only when the tables yielded nothing at all. Whichever
/// branch produced output wins — results are never merged.
pub fn parse_income_values(content: &PdfContent, today: NaiveDate) -> Vec<ParsedIncomeCandidate> {
    let mut results = Vec::new();

    for table in &content.tables {
        results.extend(table_strategy::parse_table(table, today));
    }

    if results.is_empty() {
        results = text_patterns::parse_text(&content.text, today);
    }

    results
}

/// Parse a Brazilian-format currency string into integer cents.
///
/// `R$ 1.234,56` -> 123456. Strips `R`, `$` and whitespace, drops thousands
/// dots, converts the decimal comma. Returns 0 when nothing parseable
/// remains; callers treat any non-positive result as "discard".
pub fn parse_brl_cents(value: &str) -> i64 {
    let clean: String = value
        .chars()
        .filter(|c| *c != 'R' && *c != '$' && !c.is_whitespace())
        .collect();
    let clean = clean.replace('.', "").replace(',', ".");

    match clean.parse::<f64>() {
        Ok(v) => ((v * 100.0).trunc() as i64).max(0),
        Err(_) => 0,
    }
}

static RE_DATE_DMY_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})").unwrap());
static RE_DATE_DMY_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})-(\d{2})-(\d{4})").unwrap());
static RE_DATE_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap());

/// Parse a date string, defaulting to `today` when nothing matches.
///
/// Tries `dd/mm/yyyy`, `dd-mm-yyyy`, `yyyy-mm-dd` in that order, anchored
/// at the start of the string. A pattern whose digits do not form a valid
/// calendar date counts as a non-match and the next pattern is tried.
pub fn parse_date_br(value: &str, today: NaiveDate) -> NaiveDate {
    let value = value.trim();
    if value.is_empty() {
        return today;
    }

    if let Some(c) = RE_DATE_DMY_SLASH.captures(value) {
        if let Some(d) = ymd(&c[3], &c[2], &c[1]) {
            return d;
        }
    }
    if let Some(c) = RE_DATE_DMY_DASH.captures(value) {
        if let Some(d) = ymd(&c[3], &c[2], &c[1]) {
            return d;
        }
    }
    if let Some(c) = RE_DATE_ISO.captures(value) {
        if let Some(d) = ymd(&c[1], &c[2], &c[3]) {
            return d;
        }
    }

    today
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// True when a cell is purely numeric once currency punctuation is removed.
pub fn is_numeric(value: &str) -> bool {
    let clean: String = value
        .chars()
        .filter(|c| !matches!(c, 'R' | '$' | '.' | ',') && !c.is_whitespace())
        .collect();
    !clean.is_empty() && clean.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
