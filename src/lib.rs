//! Listing Processor Library
//!
//! Cleans semicolon-delimited marketplace listing exports (best sellers and
//! movers & shakers) into a typed, comma-delimited dataset.
//!
//! This library provides tools for:
//! - Mapping inconsistent scrape headers onto canonical fields
//! - Parsing prices, ratings, review counts and ranks from free text
//! - Extracting product identifiers from listing URLs
//! - Decomposing category breadcrumbs into hierarchy levels
//! - Per-category price segmentation and review density normalization
//! - Sales rank movement features for movers & shakers exports

pub mod category;
pub mod cli;
pub mod config;
pub mod constants;
pub mod currency;
pub mod error;
pub mod fields;
pub mod header;
pub mod identifier;
pub mod models;
pub mod processor;
pub mod stats;

pub use config::PipelineConfig;
pub use error::{ListingError, Result};
pub use models::{
    ListingRecord, NormalizationPolicy, PriceSegment, ProcessingMode, ProcessingStats, RawTable,
};
pub use processor::ListingProcessor;
