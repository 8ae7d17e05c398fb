//! Category breadcrumb decomposition.
//!
//! Turns free text such as `"Best Sellers in Home & Kitchen > Bakeware"` into
//! the breadcrumb after the `in` marker and its first two hierarchy levels.

use crate::fields::non_blank;
use crate::models::CategoryHierarchy;
use regex::Regex;
use std::sync::LazyLock;

static IN_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin\s+(.*)").expect("marker pattern is valid"));

static LEVEL_DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[>/›»|,]| - | & ").expect("delimiter pattern is valid"));

/// Decompose a raw category string into `(category_full, level 1, level 2)`
pub fn decompose(raw: Option<&str>) -> CategoryHierarchy {
    let Some(text) = non_blank(raw) else {
        return CategoryHierarchy::default();
    };

    let full = match IN_MARKER_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(remainder) => remainder.as_str().trim(),
        None => text,
    };

    let mut levels = LEVEL_DELIMITER_RE
        .split(full)
        .map(str::trim)
        .filter(|segment| !segment.is_empty());

    let cat_level_1 = levels.next().map(str::to_string);
    let cat_level_2 = levels.next().map(str::to_string);

    CategoryHierarchy {
        category_full: (!full.is_empty()).then(|| full.to_string()),
        cat_level_1,
        cat_level_2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(raw: &str) -> (Option<String>, Option<String>, Option<String>) {
        let h = decompose(Some(raw));
        (h.category_full, h.cat_level_1, h.cat_level_2)
    }

    #[test]
    fn test_best_sellers_heading() {
        assert_eq!(
            levels("Best Sellers in Electronics"),
            (Some("Electronics".into()), Some("Electronics".into()), None)
        );
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        assert_eq!(
            levels("MOVERS & SHAKERS IN Toys & Games"),
            (
                Some("Toys & Games".into()),
                Some("Toys".into()),
                Some("Games".into())
            )
        );
    }

    #[test]
    fn test_breadcrumb_delimiters() {
        let cases = [
            "Home > Kitchen > Bakeware",
            "Home / Kitchen",
            "Home › Kitchen",
            "Home » Kitchen",
            "Home | Kitchen",
            "Home, Kitchen",
            "Home - Kitchen",
            "Home & Kitchen",
        ];
        for case in cases {
            let (_, l1, l2) = levels(case);
            assert_eq!(l1.as_deref(), Some("Home"), "{case}");
            assert_eq!(l2.as_deref(), Some("Kitchen"), "{case}");
        }
    }

    #[test]
    fn test_hyphenated_words_are_not_split() {
        let (_, l1, l2) = levels("Best Sellers in T-Shirts");
        assert_eq!(l1.as_deref(), Some("T-Shirts"));
        assert_eq!(l2, None);
    }

    #[test]
    fn test_empty_segments_discarded() {
        let (full, l1, l2) = levels("in  > > Books >> Fiction");
        assert_eq!(full.as_deref(), Some("> > Books >> Fiction"));
        assert_eq!(l1.as_deref(), Some("Books"));
        assert_eq!(l2.as_deref(), Some("Fiction"));
    }

    #[test]
    fn test_in_inside_words_is_not_a_marker() {
        let (full, l1, _) = levels("Skin Care");
        assert_eq!(full.as_deref(), Some("Skin Care"));
        assert_eq!(l1.as_deref(), Some("Skin Care"));
    }

    #[test]
    fn test_without_marker_uses_whole_text() {
        assert_eq!(
            levels("  Electronics > Headphones  "),
            (
                Some("Electronics > Headphones".into()),
                Some("Electronics".into()),
                Some("Headphones".into())
            )
        );
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(decompose(None), CategoryHierarchy::default());
        assert_eq!(decompose(Some("   ")), CategoryHierarchy::default());
    }
}
