//! Text-pattern strategy: currency and date tokens from raw text.
//!
//! Fallback for documents whose tables yielded nothing: scans the full
//! extracted text for Brazilian-locale currency tokens and dates, pairing
//! them positionally.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_brl_cents, parse_date_br, ParsedIncomeCandidate};

/// Currency token: optional "R$" prefix, thousands grouped by '.', exactly
/// two decimals after ','. Only the numeric part is captured.
static RE_CURRENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"R?\$?\s*(\d{1,3}(?:\.\d{3})*,\d{2})").unwrap());
static RE_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2}/\d{2}/\d{4})").unwrap());

/// Half-width of the description context window, in characters.
const CONTEXT_CHARS: usize = 50;

/// Scan raw text for currency tokens and emit one candidate per positive
/// amount.
///
/// The i-th currency token is paired with the i-th date token by position
/// in the match lists, not by textual proximity; currency tokens beyond the
/// last date default to `today`. Tokens that parse to zero are dropped
/// silently.
pub fn parse_text(text: &str, today: NaiveDate) -> Vec<ParsedIncomeCandidate> {
    let amounts: Vec<&str> = RE_CURRENCY
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    let dates: Vec<&str> = RE_DATE.find_iter(text).map(|m| m.as_str()).collect();

    let mut results = Vec::new();
    for (i, amount_str) in amounts.iter().enumerate() {
        let amount = parse_brl_cents(amount_str);
        if amount == 0 {
            log::debug!("currency token dropped: {:?}", amount_str);
            continue;
        }

        let expected_date = dates.get(i).map_or(today, |d| parse_date_br(d, today));

        let description = context_window(text, amount_str)
            .unwrap_or_else(|| format!("Value #{}", i + 1));

        results.push(ParsedIncomeCandidate {
            client_name: "Imported from PDF".to_string(),
            description,
            amount_cents: amount,
            expected_date,
            raw_text: (*amount_str).to_string(),
        });
    }

    results
}

/// Up to `CONTEXT_CHARS` characters on each side of the first occurrence of
/// `token`, trimmed; the window does not cross newlines. `None` only when
/// the token cannot be located at all, which should not happen for tokens
/// that came out of `text` in the first place.
fn context_window(text: &str, token: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r".{{0,{n}}}{t}.{{0,{n}}}",
        n = CONTEXT_CHARS,
        t = regex::escape(token)
    ))
    .ok()?;
    re.find(text).map(|m| m.as_str().trim().to_string())
}
