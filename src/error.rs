//! Library error type.

use thiserror::Error;

/// Errors surfaced by the extraction pipeline.
///
/// Only document-level failures become errors. Malformed rows and tokens are
/// skipped where they occur and never abort a parse.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file could not be opened or its internal structure could not be
    /// read at all. No partial result accompanies this error.
    #[error("could not read document: {0}")]
    DocumentUnreadable(String),
}
