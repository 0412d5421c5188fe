//! Conversion of parsed candidates into forecast records.
//!
//! The host that persists expected-income rows attaches a source-document
//! label, a reference period and an initial status to every candidate; that
//! in-memory shaping lives here. Persistence itself stays with the host.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pdf_import::ParsedIncomeCandidate;

/// Lifecycle status of an expected-income record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeStatus {
    Pending,
    Received,
    Partial,
    Overdue,
}

/// One expected-income record ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedIncomeRecord {
    pub source_document: String,
    pub client_name: String,
    pub description: String,
    pub expected_amount_cents: i64,
    pub expected_date: NaiveDate,
    pub actual_amount_cents: i64,
    pub status: IncomeStatus,
    pub reference_month: u32,
    pub reference_year: i32,
}

/// Attach a source label, reference period and initial status to candidates.
///
/// `month` must be 1-12 and `year` 2020 or later, mirroring the upload
/// boundary's validation. Every record starts `pending` with no actual
/// amount.
pub fn to_forecast_records(
    candidates: Vec<ParsedIncomeCandidate>,
    source_document: &str,
    month: u32,
    year: i32,
) -> Result<Vec<ExpectedIncomeRecord>, String> {
    if !(1..=12).contains(&month) {
        return Err(format!("reference month out of range: {}", month));
    }
    if year < 2020 {
        return Err(format!("reference year out of range: {}", year));
    }

    Ok(candidates
        .into_iter()
        .map(|c| ExpectedIncomeRecord {
            source_document: source_document.to_string(),
            client_name: c.client_name,
            description: c.description,
            expected_amount_cents: c.amount_cents,
            expected_date: c.expected_date,
            actual_amount_cents: 0,
            status: IncomeStatus::Pending,
            reference_month: month,
            reference_year: year,
        })
        .collect())
}
