//! Rupiah price pre-conversion.
//!
//! Storefronts browsed from Indonesia render prices as `IDR 150,000` or
//! `Rp150.000`. When enabled, these are rewritten to an approximate dollar
//! string before price parsing. The factor is static, not a live rate.

use crate::constants::IDR_CONVERSION_THRESHOLD;
use regex::Regex;
use std::sync::LazyLock;

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9.]+").expect("amount pattern is valid"));

/// Rewrite a rupiah price as `"$<usd> (converted)"`.
///
/// Dollar prices come back with commas and spaces removed; anything that is
/// neither dollars nor rupiah is returned unchanged.
pub fn convert_price(price_text: &str, idr_to_usd: f64) -> String {
    if price_text.is_empty() {
        return String::new();
    }

    let clean = price_text.trim().replace([',', ' '], "");
    if clean.starts_with('$') {
        return clean;
    }

    let lower = clean.to_lowercase();
    if lower.starts_with("idr") || lower.contains("rp") {
        let amount = AMOUNT_RE
            .find(&clean)
            .and_then(|m| m.as_str().parse::<f64>().ok());
        return match amount {
            Some(amount) => {
                let usd = if amount > IDR_CONVERSION_THRESHOLD {
                    amount * idr_to_usd
                } else {
                    amount
                };
                format!("${usd:.2} (converted)")
            }
            None => price_text.to_string(),
        };
    }

    price_text.to_string()
}
