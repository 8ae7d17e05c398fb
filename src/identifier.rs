//! Product identifier (ASIN) extraction from listing URLs.

use regex::Regex;
use std::sync::LazyLock;

/// URL shapes carrying an ASIN, tried in order
static ASIN_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"/dp/([A-Z0-9]{10})").expect("dp pattern is valid"),
        Regex::new(r"/gp/product/([A-Z0-9]{10})").expect("gp pattern is valid"),
    ]
});

/// Extract the 10-character ASIN from a `/dp/...` or `/gp/product/...` link
pub fn extract_asin(link: Option<&str>) -> Option<String> {
    let link = link?;
    ASIN_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(link))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
