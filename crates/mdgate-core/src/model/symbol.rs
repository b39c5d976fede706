//! Ticker validation.
//!
//! Symbols are kept exactly as the caller sent them (after trimming); no case
//! folding, so `aapl` and `AAPL` are distinct labels and distinct lookups.

use crate::error::{Result, MdGateError};

/// Longest accepted ticker (covers `BRK-B`, `^GSPC`, `EURUSD=X`, `SHOP.TO`).
pub const MAX_SYMBOL_LEN: usize = 32;

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')
}

/// Validate a single ticker and return its trimmed form.
pub fn validate_symbol(raw: &str) -> Result<String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(MdGateError::BadRequest("ticker must not be empty".into()));
    }
    if s.len() > MAX_SYMBOL_LEN {
        return Err(MdGateError::BadRequest(format!(
            "ticker longer than {MAX_SYMBOL_LEN} characters"
        )));
    }
    if let Some(c) = s.chars().find(|c| !is_symbol_char(*c)) {
        return Err(MdGateError::BadRequest(format!("invalid character {c:?} in ticker {s}")));
    }
    Ok(s.to_string())
}

/// Parse a comma-separated ticker list.
///
/// Empty tokens are skipped and duplicates collapse onto their first
/// occurrence; input order is otherwise preserved.
pub fn parse_symbol_list(raw: &str) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for token in raw.split(',') {
        if token.trim().is_empty() {
            continue;
        }
        let sym = validate_symbol(token)?;
        if !out.contains(&sym) {
            out.push(sym);
        }
    }
    if out.is_empty() {
        return Err(MdGateError::BadRequest("tickers must contain at least one symbol".into()));
    }
    Ok(out)
}
