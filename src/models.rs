//! Core data structures and types for listing processing.
//!
//! Defines processing modes, the canonical field set, per-row parsed and
//! derived values, and processing statistics used throughout the library.

use crate::constants::{BEST_SELLERS_COLUMNS, MOVERS_SHAKERS_COLUMNS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Which scrape export is being transformed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingMode {
    #[default]
    BestSellers,
    MoversShakers,
}

impl ProcessingMode {
    /// Normalization policy this mode applies unless configured otherwise
    pub fn default_normalization_policy(&self) -> NormalizationPolicy {
        match self {
            ProcessingMode::BestSellers => NormalizationPolicy::ZeroSpreadGuard,
            ProcessingMode::MoversShakers => NormalizationPolicy::MinSampleGuard,
        }
    }

    /// Ordered output columns for this mode
    pub fn output_columns(&self) -> &'static [&'static str] {
        match self {
            ProcessingMode::BestSellers => BEST_SELLERS_COLUMNS,
            ProcessingMode::MoversShakers => MOVERS_SHAKERS_COLUMNS,
        }
    }

    /// Whether rank movement fields are parsed and derived
    pub fn tracks_rank_movement(&self) -> bool {
        matches!(self, ProcessingMode::MoversShakers)
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingMode::BestSellers => write!(f, "best-sellers"),
            ProcessingMode::MoversShakers => write!(f, "movers-shakers"),
        }
    }
}

/// How a category group's review densities are min-max normalized when the
/// group is degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationPolicy {
    /// Only a zero spread (min == max) is special-cased, assigning 0.0 to the
    /// whole group. A group with no densities at all stays missing.
    ZeroSpreadGuard,
    /// Fewer than two present densities assigns 0.0 to the whole group before
    /// min/max are computed; a zero spread does the same.
    MinSampleGuard,
}

/// Semantic column every heterogeneous input header is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Rank,
    Page,
    Category,
    Title,
    Link,
    RatingRaw,
    ReviewCountRaw,
    PriceRaw,
    MovePctRaw,
    SalesRankNowRaw,
    SalesRankWasRaw,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Rank => "rank",
            CanonicalField::Page => "page",
            CanonicalField::Category => "category",
            CanonicalField::Title => "title",
            CanonicalField::Link => "link",
            CanonicalField::RatingRaw => "rating_raw",
            CanonicalField::ReviewCountRaw => "review_count_raw",
            CanonicalField::PriceRaw => "price_raw",
            CanonicalField::MovePctRaw => "move_pct_raw",
            CanonicalField::SalesRankNowRaw => "sales_rank_now_raw",
            CanonicalField::SalesRankWasRaw => "sales_rank_was_raw",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw dataset as read: header names plus row-major string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from borrowed cells, treating every cell as present
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row projected onto the canonical field set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRecord {
    pub rank: Option<String>,
    pub page: Option<String>,
    pub category: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub rating_raw: Option<String>,
    pub review_count_raw: Option<String>,
    pub price_raw: Option<String>,
    pub move_pct_raw: Option<String>,
    pub sales_rank_now_raw: Option<String>,
    pub sales_rank_was_raw: Option<String>,
}

impl CanonicalRecord {
    pub fn set(&mut self, field: CanonicalField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Rank => self.rank.as_deref(),
            CanonicalField::Page => self.page.as_deref(),
            CanonicalField::Category => self.category.as_deref(),
            CanonicalField::Title => self.title.as_deref(),
            CanonicalField::Link => self.link.as_deref(),
            CanonicalField::RatingRaw => self.rating_raw.as_deref(),
            CanonicalField::ReviewCountRaw => self.review_count_raw.as_deref(),
            CanonicalField::PriceRaw => self.price_raw.as_deref(),
            CanonicalField::MovePctRaw => self.move_pct_raw.as_deref(),
            CanonicalField::SalesRankNowRaw => self.sales_rank_now_raw.as_deref(),
            CanonicalField::SalesRankWasRaw => self.sales_rank_was_raw.as_deref(),
        }
    }

    fn slot_mut(&mut self, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::Rank => &mut self.rank,
            CanonicalField::Page => &mut self.page,
            CanonicalField::Category => &mut self.category,
            CanonicalField::Title => &mut self.title,
            CanonicalField::Link => &mut self.link,
            CanonicalField::RatingRaw => &mut self.rating_raw,
            CanonicalField::ReviewCountRaw => &mut self.review_count_raw,
            CanonicalField::PriceRaw => &mut self.price_raw,
            CanonicalField::MovePctRaw => &mut self.move_pct_raw,
            CanonicalField::SalesRankNowRaw => &mut self.sales_rank_now_raw,
            CanonicalField::SalesRankWasRaw => &mut self.sales_rank_was_raw,
        }
    }
}

/// Category breadcrumb split into its first two levels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryHierarchy {
    pub category_full: Option<String>,
    pub cat_level_1: Option<String>,
    pub cat_level_2: Option<String>,
}

/// Typed values parsed from one canonical record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecord {
    pub rank: Option<i64>,
    pub page: Option<i64>,
    pub asin: Option<String>,
    pub price_norm: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub move_pct: Option<f64>,
    pub sales_rank_now: Option<f64>,
    pub sales_rank_was: Option<f64>,
    pub category: CategoryHierarchy,
}

/// Price bucket relative to the row's category group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceSegment {
    Low,
    Mid,
    High,
    #[default]
    Unknown,
}

impl PriceSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSegment::Low => "Low",
            PriceSegment::Mid => "Mid",
            PriceSegment::High => "High",
            PriceSegment::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PriceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a sales rank move. `Up` means the previous rank number was
/// larger than the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
    NoChange,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
            MoveDirection::NoChange => "no_change",
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales rank movement between two scrape observations
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankDelta {
    pub change: Option<f64>,
    pub change_abs: Option<f64>,
    pub direction: Option<MoveDirection>,
}

/// Features computed after parsing, some of them groupwise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedFeatures {
    pub price_segment: PriceSegment,
    pub review_density: Option<f64>,
    pub norm_review_density: Option<f64>,
    pub rank_delta: RankDelta,
}

/// A fully processed row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRecord {
    pub raw: CanonicalRecord,
    pub parsed: ParsedRecord,
    pub features: DerivedFeatures,
}

/// Processing statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub mode: ProcessingMode,
    pub rows_read: usize,
    pub rows_written: usize,
    pub category_groups: usize,
    pub mapped_fields: Vec<String>,
    pub unmapped_headers: Vec<String>,
    /// Missing-value counts keyed by parsed field name
    pub missing_counts: BTreeMap<String, usize>,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Count of rows where `field` ended up missing
    pub fn missing(&self, field: &str) -> usize {
        self.missing_counts.get(field).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_policies() {
        assert_eq!(
            ProcessingMode::BestSellers.default_normalization_policy(),
            NormalizationPolicy::ZeroSpreadGuard
        );
        assert_eq!(
            ProcessingMode::MoversShakers.default_normalization_policy(),
            NormalizationPolicy::MinSampleGuard
        );
        assert!(!ProcessingMode::BestSellers.tracks_rank_movement());
        assert!(ProcessingMode::MoversShakers.tracks_rank_movement());
    }

    #[test]
    fn test_output_columns_end_with_scraped_at() {
        for mode in [ProcessingMode::BestSellers, ProcessingMode::MoversShakers] {
            assert_eq!(mode.output_columns().last(), Some(&"scraped_at"));
        }
        assert!(
            !ProcessingMode::BestSellers
                .output_columns()
                .contains(&"move_direction")
        );
    }

    #[test]
    fn test_canonical_record_set_get() {
        let mut record = CanonicalRecord::default();
        record.set(CanonicalField::SalesRankNowRaw, Some("12".to_string()));
        assert_eq!(record.get(CanonicalField::SalesRankNowRaw), Some("12"));
        assert_eq!(record.get(CanonicalField::Rank), None);

        record.set(CanonicalField::SalesRankNowRaw, None);
        assert_eq!(record.sales_rank_now_raw, None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PriceSegment::Unknown.to_string(), "unknown");
        assert_eq!(PriceSegment::default(), PriceSegment::Unknown);
        assert_eq!(MoveDirection::NoChange.to_string(), "no_change");
        assert_eq!(ProcessingMode::MoversShakers.to_string(), "movers-shakers");
    }
}
