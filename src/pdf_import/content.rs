//! Content extraction: plain text and table grids from a PDF.
//!
//! Text comes from `pdf-extract`'s page-wise API. Since that yields plain
//! text only, table structures are recovered per page from line layout:
//! consecutive lines that split into multiple cells on a delimiter or on
//! runs of spaces.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ImportError;

/// One detected table: ordered rows of optional cell strings. The first row
/// is a provisional header; headerless tables are tolerated downstream.
pub type Table = Vec<Vec<Option<String>>>;

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfContent {
    /// Page texts in document order, joined with newlines.
    pub text: String,
    /// Every grid detected, pages in order.
    pub tables: Vec<Table>,
}

/// Extract text and tables from a PDF file.
///
/// A page with no extractable text contributes an empty string and a page
/// with no tables contributes nothing. Only a document that cannot be read
/// at all fails the operation, with no partial result.
pub fn extract_content(pdf_path: &Path) -> Result<PdfContent, ImportError> {
    let pages = pdf_extract::extract_text_by_pages(pdf_path)
        .map_err(|e| ImportError::DocumentUnreadable(e.to_string()))?;

    let mut text = String::new();
    let mut tables = Vec::new();
    for page in &pages {
        text.push_str(page);
        text.push('\n');
        tables.extend(detect_tables(page));
    }

    log::debug!(
        "extracted {} page(s), {} chars, {} table(s) from {}",
        pages.len(),
        text.len(),
        tables.len(),
        pdf_path.display()
    );

    Ok(PdfContent { text, tables })
}

static RE_MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Minimum consecutive tabular lines for a block to count as a table.
const MIN_GRID_ROWS: usize = 2;

/// Detect table grids in one page of extracted text.
///
/// A line is row-shaped when it splits into two or more cells on an explicit
/// delimiter (`|` or tab) or on runs of two or more spaces. Two or more
/// consecutive row-shaped lines form one grid; rows are padded with `None`
/// to the widest row. An isolated row-shaped line is not a table.
pub fn detect_tables(page_text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Table = Vec::new();

    for line in page_text.lines() {
        match split_row(line) {
            Some(cells) => current.push(cells),
            None => flush_grid(&mut current, &mut tables),
        }
    }
    flush_grid(&mut current, &mut tables);

    tables
}

fn flush_grid(current: &mut Table, tables: &mut Vec<Table>) {
    if current.len() >= MIN_GRID_ROWS {
        let width = current.iter().map(Vec::len).max().unwrap_or(0);
        for row in current.iter_mut() {
            row.resize(width, None);
        }
        tables.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Split a line into cells, or `None` when the line is not row-shaped.
fn split_row(line: &str) -> Option<Vec<Option<String>>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = if trimmed.contains('|') {
        trimmed.trim_matches('|').split('|').collect()
    } else if trimmed.contains('\t') {
        trimmed.split('\t').collect()
    } else {
        RE_MULTI_SPACE.split(trimmed).collect()
    };

    if parts.len() < 2 {
        return None;
    }

    Some(
        parts
            .iter()
            .map(|p| {
                let cell = p.trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_tables_multi_space() {
        let page = "Relação de recebimentos\n\
                    Cliente        Valor       Data\n\
                    Acme Ltda      1.500,00    10/05/2024\n\
                    Beta SA        2.000,00    12/05/2024\n\
                    \n\
                    Fim do relatório";
        let tables = detect_tables(page);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3);
        assert_eq!(tables[0][0][0].as_deref(), Some("Cliente"));
        assert_eq!(tables[0][1][1].as_deref(), Some("1.500,00"));
        assert_eq!(tables[0][2][2].as_deref(), Some("12/05/2024"));
    }

    #[test]
    fn test_detect_tables_pipe_delimited() {
        let page = "| Cliente | Valor | Data |\n\
                    | Acme | 1.500,00 | 10/05/2024 |";
        let tables = detect_tables(page);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][0].len(), 3);
        assert_eq!(tables[0][1][0].as_deref(), Some("Acme"));
    }

    #[test]
    fn test_short_rows_padded_with_none() {
        let page = "Cliente  Valor  Data\n\
                    Acme  1.500,00";
        let tables = detect_tables(page);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][1].len(), 3);
        assert_eq!(tables[0][1][2], None);
    }

    #[test]
    fn test_isolated_tabular_line_is_not_a_table() {
        let page = "Cabeçalho do documento\n\
                    Acme  1.500,00\n\
                    Texto corrido sem colunas";
        assert!(detect_tables(page).is_empty());
    }

    #[test]
    fn test_plain_prose_yields_no_tables() {
        let page = "Fatura referente ao mês de maio.\nTotal: R$ 1.234,56";
        assert!(detect_tables(page).is_empty());
    }

    #[test]
    fn test_unreadable_file_is_a_document_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"this is not a pdf at all").unwrap();

        let err = extract_content(tmp.path()).unwrap_err();
        assert!(matches!(err, ImportError::DocumentUnreadable(_)));
    }

    #[test]
    fn test_missing_file_is_a_document_error() {
        let err = extract_content(Path::new("/nonexistent/arquivo.pdf")).unwrap_err();
        assert!(matches!(err, ImportError::DocumentUnreadable(_)));
    }
}
