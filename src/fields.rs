//! Field parsing utilities for raw listing cells
//!
//! Every parser takes an optional raw string and returns an optional typed
//! value. Blank, absent or unparsable input yields `None`; nothing here
//! returns an error or falls back to zero.

use crate::constants::{MISSING_PRICE_LITERALS, PRICE_NOISE_TOKENS};
use regex::Regex;
use std::sync::LazyLock;

static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("parenthetical pattern is valid"));

static PRICE_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = PRICE_NOISE_TOKENS
        .iter()
        .map(|token| regex::escape(token))
        .collect();
    Regex::new(&format!("(?i)({})", alternatives.join("|"))).expect("noise pattern is valid")
});

static NON_PRICE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.,\-]").expect("price charset pattern is valid"));

static NUMBER_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.[0-9]+|[0-9]+").expect("number pattern is valid"));

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.[0-9]+").expect("decimal pattern is valid"));

/// Trimmed cell content, or `None` when the cell is absent or blank
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a price such as `"$1,234.56"` or `"$9.00 (converted)"`.
///
/// Parenthetical annotations and noise words are removed first. A comma is
/// always read as a thousands separator. When several numbers remain (price
/// ranges), the last one is used.
pub fn parse_price(raw: Option<&str>) -> Option<f64> {
    let text = non_blank(raw)?.to_lowercase();
    if MISSING_PRICE_LITERALS.contains(&text.as_str()) {
        return None;
    }

    let without_notes = PARENTHETICAL_RE.replace_all(&text, "");
    let without_noise = PRICE_NOISE_RE.replace_all(&without_notes, "");
    let numeric = NON_PRICE_CHARS_RE.replace_all(&without_noise, "");
    let numeric = numeric.replace(',', "");

    NUMBER_TOKEN_RE
        .find_iter(&numeric)
        .last()
        .and_then(|token| token.as_str().parse::<f64>().ok())
}

/// Parse the first decimal number, e.g. `"4.5 out of 5 stars"` -> 4.5.
///
/// Integral ratings without a decimal point are treated as missing.
pub fn parse_rating(raw: Option<&str>) -> Option<f64> {
    let text = non_blank(raw)?;
    DECIMAL_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parse an integer after discarding every non-digit character
pub fn parse_int(raw: Option<&str>) -> Option<i64> {
    let digits: String = non_blank(raw)?
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()
}

/// Parse a float after discarding everything except digits, `.` and `-`
pub fn parse_float(raw: Option<&str>) -> Option<f64> {
    let kept: String = non_blank(raw)?
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if kept.is_empty() {
        return None;
    }
    kept.parse::<f64>().ok()
}
