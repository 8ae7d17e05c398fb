//! Header analysis and canonical column mapping.
//!
//! Scrape exports do not agree on header names (`Rank`, `rank_no`,
//! `Product URL`, `Sales Rank Now`, ...). Each trimmed, lower-cased header is
//! run through an ordered rule table for the active mode; the first rule that
//! matches decides its canonical field. When two headers land on the same
//! field the later header wins.

use crate::models::{CanonicalField, CanonicalRecord, ProcessingMode};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One header-matching rule; `matches` receives the lower-cased header
#[derive(Debug, Clone, Copy)]
struct MappingRule {
    field: CanonicalField,
    matches: fn(&str) -> bool,
}

fn contains_rank(h: &str) -> bool {
    h.contains("rank")
}

fn listing_rank(h: &str) -> bool {
    h.starts_with("rank") && !h.contains("sales")
}

fn is_page(h: &str) -> bool {
    h == "page"
}

fn is_category(h: &str) -> bool {
    h.contains("category")
}

fn is_title(h: &str) -> bool {
    h.contains("title")
}

fn is_link(h: &str) -> bool {
    h.contains("link") || h.contains("url")
}

fn is_rating(h: &str) -> bool {
    h.contains("rating")
}

fn is_review(h: &str) -> bool {
    h.contains("review")
}

fn is_price(h: &str) -> bool {
    h.contains("price")
}

fn is_price_not_move(h: &str) -> bool {
    h.contains("price") && !h.contains("move")
}

fn is_move(h: &str) -> bool {
    h.contains("move")
}

fn is_sales_rank_now(h: &str) -> bool {
    h.contains("sales_rank_now") || h.contains("rank now")
}

fn is_sales_rank_was(h: &str) -> bool {
    h.contains("sales_rank_was") || h.contains("rank was")
}

static BEST_SELLERS_RULES: &[MappingRule] = &[
    MappingRule { field: CanonicalField::Rank, matches: contains_rank },
    MappingRule { field: CanonicalField::Page, matches: is_page },
    MappingRule { field: CanonicalField::Category, matches: is_category },
    MappingRule { field: CanonicalField::Title, matches: is_title },
    MappingRule { field: CanonicalField::Link, matches: is_link },
    MappingRule { field: CanonicalField::RatingRaw, matches: is_rating },
    MappingRule { field: CanonicalField::ReviewCountRaw, matches: is_review },
    MappingRule { field: CanonicalField::PriceRaw, matches: is_price },
];

static MOVERS_SHAKERS_RULES: &[MappingRule] = &[
    MappingRule { field: CanonicalField::Page, matches: is_page },
    MappingRule { field: CanonicalField::Rank, matches: listing_rank },
    MappingRule { field: CanonicalField::Category, matches: is_category },
    MappingRule { field: CanonicalField::Title, matches: is_title },
    MappingRule { field: CanonicalField::Link, matches: is_link },
    MappingRule { field: CanonicalField::RatingRaw, matches: is_rating },
    MappingRule { field: CanonicalField::ReviewCountRaw, matches: is_review },
    MappingRule { field: CanonicalField::PriceRaw, matches: is_price_not_move },
    MappingRule { field: CanonicalField::MovePctRaw, matches: is_move },
    MappingRule { field: CanonicalField::SalesRankNowRaw, matches: is_sales_rank_now },
    MappingRule { field: CanonicalField::SalesRankWasRaw, matches: is_sales_rank_was },
];

fn rules_for(mode: ProcessingMode) -> &'static [MappingRule] {
    match mode {
        ProcessingMode::BestSellers => BEST_SELLERS_RULES,
        ProcessingMode::MoversShakers => MOVERS_SHAKERS_RULES,
    }
}

/// Canonical field for a single header, if any rule matches
pub fn map_header(header: &str, mode: ProcessingMode) -> Option<CanonicalField> {
    let lowered = header.trim().to_lowercase();
    rules_for(mode)
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .map(|rule| rule.field)
}

/// Canonical field to source column index mapping for one table
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    field_to_index: BTreeMap<CanonicalField, usize>,
    headers: Vec<String>,
    unmapped_headers: Vec<String>,
}

impl ColumnMapping {
    /// Analyze the header row of a table
    pub fn analyze(headers: &[String], mode: ProcessingMode) -> Self {
        let mut field_to_index = BTreeMap::new();
        let mut unmapped_headers = Vec::new();
        let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        for (index, header) in trimmed.iter().enumerate() {
            match map_header(header, mode) {
                Some(field) => {
                    if let Some(previous) = field_to_index.insert(field, index) {
                        warn!(
                            "Headers '{}' and '{}' both map to '{}'; using '{}'",
                            trimmed[previous], header, field, header
                        );
                    }
                }
                None => unmapped_headers.push(header.clone()),
            }
        }

        debug!(
            "Mapped {} of {} headers for {} mode",
            field_to_index.len(),
            trimmed.len(),
            mode
        );

        Self {
            field_to_index,
            headers: trimmed,
            unmapped_headers,
        }
    }

    /// Source column index of a canonical field
    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.field_to_index.get(&field).copied()
    }

    /// Check if a canonical field has a source column
    pub fn contains(&self, field: CanonicalField) -> bool {
        self.field_to_index.contains_key(&field)
    }

    /// Trimmed source header backing a canonical field
    pub fn source_header(&self, field: CanonicalField) -> Option<&str> {
        self.index_of(field)
            .and_then(|index| self.headers.get(index))
            .map(String::as_str)
    }

    pub fn mapped_fields(&self) -> Vec<CanonicalField> {
        self.field_to_index.keys().copied().collect()
    }

    pub fn unmapped_headers(&self) -> &[String] {
        &self.unmapped_headers
    }

    /// Project one raw row onto the canonical fields
    pub fn project(&self, row: &[Option<String>]) -> CanonicalRecord {
        let mut record = CanonicalRecord::default();
        for (&field, &index) in &self.field_to_index {
            record.set(field, row.get(index).cloned().flatten());
        }
        record
    }
}
