//! Table strategy: infer column roles from a grid and emit candidates.
//!
//! Column roles (amount, date, description) are detected by keyword match
//! against the header row, with a structural fallback for headerless
//! tables. One candidate per usable data row.

use chrono::NaiveDate;

use super::{
    is_numeric, parse_brl_cents, parse_date_br, truncate_chars, ParsedIncomeCandidate, Table,
    CLIENT_NAME_MAX,
};

/// Header keywords per role, Portuguese and English synonyms, matched as
/// lowercase substrings. The first header cell containing any keyword wins
/// the role; roles are assigned independently, so one column may serve
/// several. Keep these lists and their order stable: candidate output is
/// only reproducible across runs if role detection is.
const AMOUNT_KEYWORDS: &[&str] = &[
    "valor", "value", "total", "amount", "quantia", "preço", "preco",
];
const DATE_KEYWORDS: &[&str] = &["data", "date", "vencimento", "due", "prazo", "pagamento"];
const DESCRIPTION_KEYWORDS: &[&str] = &[
    "descricao",
    "descrição",
    "description",
    "cliente",
    "client",
    "nome",
    "name",
    "item",
];

/// Outcome of one data row. Skips never abort the table.
enum RowOutcome {
    Emit(ParsedIncomeCandidate),
    Skip(&'static str),
}

/// Parse one table into candidates.
///
/// Returns an empty list for tables with fewer than two rows (no header
/// plus data row means nothing usable). Malformed rows are skipped and the
/// rest of the table is still processed.
pub fn parse_table(table: &Table, today: NaiveDate) -> Vec<ParsedIncomeCandidate> {
    let mut results = Vec::new();
    if table.len() < 2 {
        return results;
    }

    let header: Vec<String> = table[0]
        .iter()
        .map(|c| c.as_deref().unwrap_or("").to_lowercase())
        .collect();

    let date_col = find_column(&header, DATE_KEYWORDS);
    let desc_col = find_column(&header, DESCRIPTION_KEYWORDS);

    // Headerless fallback: the first cell of the first data row that parses
    // to a positive amount fixes the amount column for the whole table.
    let amount_col = find_column(&header, AMOUNT_KEYWORDS).or_else(|| {
        table[1]
            .iter()
            .position(|cell| cell.as_deref().is_some_and(|c| parse_brl_cents(c) > 0))
    });

    for row in &table[1..] {
        match parse_row(row, amount_col, date_col, desc_col, today) {
            RowOutcome::Emit(candidate) => results.push(candidate),
            RowOutcome::Skip(reason) => log::debug!("table row skipped: {}", reason),
        }
    }

    results
}

fn find_column(header: &[String], keywords: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|col| !col.is_empty() && keywords.iter().any(|kw| col.contains(kw)))
}

fn parse_row(
    row: &[Option<String>],
    amount_col: Option<usize>,
    date_col: Option<usize>,
    desc_col: Option<usize>,
    today: NaiveDate,
) -> RowOutcome {
    if row
        .iter()
        .all(|c| c.as_deref().map_or(true, str::is_empty))
    {
        return RowOutcome::Skip("empty row");
    }

    let cell_at = |i: usize| {
        row.get(i)
            .and_then(|c| c.as_deref())
            .filter(|s| !s.is_empty())
    };

    // Amount: designated column first, then the whole row left-to-right.
    let mut amount = amount_col
        .and_then(cell_at)
        .map(parse_brl_cents)
        .unwrap_or(0);
    if amount == 0 {
        amount = row
            .iter()
            .flatten()
            .map(|c| parse_brl_cents(c))
            .find(|v| *v > 0)
            .unwrap_or(0);
    }
    if amount == 0 {
        return RowOutcome::Skip("no positive amount");
    }

    // Date: designated column when present and non-empty, otherwise the
    // first cell whose parse differs from today (a recognizable explicit
    // date), else today.
    let expected_date = match date_col.and_then(cell_at) {
        Some(cell) => parse_date_br(cell, today),
        None => row
            .iter()
            .flatten()
            .map(|c| parse_date_br(c, today))
            .find(|d| *d != today)
            .unwrap_or(today),
    };

    // Description: designated column, else the first cell that is not
    // purely numeric, else every non-empty cell joined.
    let mut description = match desc_col.and_then(cell_at) {
        Some(cell) => cell.to_string(),
        None => row
            .iter()
            .flatten()
            .find(|c| !c.is_empty() && !is_numeric(c))
            .cloned()
            .unwrap_or_default(),
    };
    if description.is_empty() {
        description = row
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" | ");
    }

    let raw_cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();

    RowOutcome::Emit(ParsedIncomeCandidate {
        client_name: truncate_chars(&description, CLIENT_NAME_MAX),
        description,
        amount_cents: amount,
        expected_date,
        raw_text: format!("{:?}", raw_cells),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn sample_table() -> Table {
        vec![
            vec![cell("Cliente"), cell("Valor"), cell("Data")],
            vec![cell("Acme"), cell("1.500,00"), cell("10/05/2024")],
        ]
    }

    #[test]
    fn test_header_table() {
        let candidates = parse_table(&sample_table(), fixed_today());
        assert_eq!(candidates.len(), 1);

        let c = &candidates[0];
        assert_eq!(c.amount_cents, 150000);
        assert_eq!(c.expected_date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert!(c.client_name.contains("Acme"));
        assert_eq!(c.description, "Acme");
        assert!(c.raw_text.contains("1.500,00"));
    }

    #[test]
    fn test_idempotent() {
        let table = sample_table();
        let first = parse_table(&table, fixed_today());
        let second = parse_table(&table, fixed_today());
        assert_eq!(first, second);
    }

    #[test]
    fn test_too_small_tables_yield_nothing() {
        let today = fixed_today();
        assert!(parse_table(&vec![], today).is_empty());
        assert!(parse_table(&vec![vec![cell("Valor")]], today).is_empty());
    }

    #[test]
    fn test_malformed_rows_skipped_valid_rows_kept() {
        let table: Table = vec![
            vec![cell("Cliente"), cell("Valor"), cell("Data")],
            vec![cell("Acme"), cell("1.500,00"), cell("10/05/2024")],
            // No amount anywhere in this row: skipped, not fatal.
            vec![None, None, cell("11/05/2024")],
            vec![None, None, None],
            vec![cell("Beta"), cell("2.000,00"), cell("12/05/2024")],
        ];
        let candidates = parse_table(&table, fixed_today());
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].description, "Acme");
        assert_eq!(candidates[1].description, "Beta");
    }

    #[test]
    fn test_headerless_table_amount_column_inferred() {
        let table: Table = vec![
            vec![cell("Acme"), cell("1.500,00"), cell("10/05/2024")],
            vec![cell("Beta"), cell("2.000,00"), cell("12/05/2024")],
        ];
        // Row 0 is still treated as a header candidate, so only row 1 emits.
        let candidates = parse_table(&table, fixed_today());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].amount_cents, 200000);
        assert_eq!(candidates[0].description, "Beta");
    }

    #[test]
    fn test_amount_found_outside_designated_column() {
        // "Valor" column holds junk; the row-wide scan still finds the money.
        let table: Table = vec![
            vec![cell("Cliente"), cell("Valor"), cell("Data")],
            vec![cell("Acme"), cell("a combinar"), cell("10/05/2024")],
        ];
        assert!(parse_table(&table, fixed_today()).is_empty());

        let table: Table = vec![
            vec![cell("Cliente"), cell("Valor"), cell("Obs")],
            vec![cell("Acme"), cell("-"), cell("750,00")],
        ];
        let candidates = parse_table(&table, fixed_today());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].amount_cents, 75000);
    }

    #[test]
    fn test_date_scanned_from_any_cell() {
        let table: Table = vec![
            vec![cell("Cliente"), cell("Valor"), cell("Obs")],
            vec![cell("Acme"), cell("1.000,00"), cell("31/12/2024")],
        ];
        let candidates = parse_table(&table, fixed_today());
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].expected_date,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_description_falls_back_to_joined_cells() {
        // Every cell is numeric, so the description joins them all.
        let table: Table = vec![
            vec![cell("Valor"), cell("Total")],
            vec![cell("100,00"), cell("200,00")],
        ];
        let candidates = parse_table(&table, fixed_today());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].description, "100,00 | 200,00");
    }

    #[test]
    fn test_one_column_can_serve_two_roles() {
        let table: Table = vec![
            vec![cell("Valor do Cliente"), cell("Data")],
            vec![cell("1.000,00"), cell("10/05/2024")],
        ];
        let candidates = parse_table(&table, fixed_today());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].amount_cents, 100000);
        // Same column also won the description role.
        assert_eq!(candidates[0].description, "1.000,00");
    }

    #[test]
    fn test_client_name_truncated_to_255_chars() {
        let long_name = "ã".repeat(300);
        let table: Table = vec![
            vec![cell("Cliente"), cell("Valor")],
            vec![cell(&long_name), cell("1.000,00")],
        ];
        let candidates = parse_table(&table, fixed_today());
        assert_eq!(candidates[0].client_name.chars().count(), 255);
        assert_eq!(candidates[0].description.chars().count(), 300);
    }
}
