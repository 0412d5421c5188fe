//! Heuristic extraction of expected-income records from financial PDFs.
//!
//! Takes an arbitrary financial PDF (invoice, statement, boleto) with no
//! fixed schema, locates monetary values, associates them with dates and
//! descriptions, and emits normalized expected-income candidates ready for
//! a host application to persist.

pub mod error;
pub mod forecast;
pub mod pdf_import;

pub use error::ImportError;
pub use pdf_import::{
    extract_content, parse_income_values, parse_pdf, ParsedIncomeCandidate, PdfContent, Table,
};
