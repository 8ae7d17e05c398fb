//! Application constants for the listing processor
//!
//! Default values, parser vocabularies and output column layouts used
//! throughout the pipeline.

// =============================================================================
// Input / Output Format
// =============================================================================

/// Field separator of the raw scrape exports
pub const INPUT_SEPARATOR: u8 = b';';

/// Field separator of the cleaned output
pub const OUTPUT_SEPARATOR: u8 = b',';

/// Date stamped onto every output row unless overridden
pub const DEFAULT_SCRAPED_AT: &str = "2025-10-25";

/// Name of the trailing date column
pub const SCRAPED_AT_COLUMN: &str = "scraped_at";

// =============================================================================
// Field Parsing
// =============================================================================

/// Words stripped from price text before numeric extraction (matched on lower-cased text)
pub const PRICE_NOISE_TOKENS: &[&str] = &[
    "converted", "approx", "usd", "us$", "from", "price", "now", "only",
];

/// Literal cell values treated as missing prices
pub const MISSING_PRICE_LITERALS: &[&str] = &["nan", "n/a", "none"];

/// Static IDR to USD factor used by price pre-conversion
pub const IDR_TO_USD: f64 = 0.000060;

/// Amounts at or below this are assumed to already be in USD
pub const IDR_CONVERSION_THRESHOLD: f64 = 10_000.0;

// =============================================================================
// Groupwise Statistics
// =============================================================================

/// Lower quantile separating "Low" from "Mid" price segments
pub const DEFAULT_LOW_QUANTILE: f64 = 0.25;

/// Upper quantile separating "Mid" from "High" price segments
pub const DEFAULT_HIGH_QUANTILE: f64 = 0.75;

// =============================================================================
// Output Layouts
// =============================================================================

/// Output columns for the best-sellers transform, in order
pub const BEST_SELLERS_COLUMNS: &[&str] = &[
    "rank",
    "page",
    "category",
    "category_full",
    "cat_level_1",
    "cat_level_2",
    "title",
    "asin",
    "link",
    "rating",
    "review_count",
    "price_raw",
    "price_norm",
    "price_segment",
    "review_density",
    "norm_review_density",
    SCRAPED_AT_COLUMN,
];

/// Output columns for the movers & shakers transform, in order
pub const MOVERS_SHAKERS_COLUMNS: &[&str] = &[
    "rank",
    "page",
    "category",
    "category_full",
    "cat_level_1",
    "cat_level_2",
    "title",
    "asin",
    "link",
    "rating",
    "review_count",
    "price_raw",
    "price_norm",
    "price_segment",
    "move_pct",
    "sales_rank_now",
    "sales_rank_was",
    "sales_rank_change",
    "sales_rank_change_abs",
    "move_direction",
    "review_density",
    "norm_review_density",
    SCRAPED_AT_COLUMN,
];

// =============================================================================
// Logging
// =============================================================================

/// Target used for the default `EnvFilter` directive
pub const LOG_TARGET: &str = "listing_processor";
