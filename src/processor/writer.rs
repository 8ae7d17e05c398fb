//! Output projection and CSV writing
//!
//! Builds the fixed, mode-specific column layout from processed records and
//! writes it as a comma-delimited file. Columns copied straight from an input
//! header are left out when that header was never mapped.

use crate::constants::{OUTPUT_SEPARATOR, SCRAPED_AT_COLUMN};
use crate::error::{ListingError, Result};
use crate::header::ColumnMapping;
use crate::models::{CanonicalField, ListingRecord, ProcessingMode};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Canonical field backing an output column that is copied from input
fn source_field(column: &str) -> Option<CanonicalField> {
    match column {
        "rank" => Some(CanonicalField::Rank),
        "page" => Some(CanonicalField::Page),
        "category" => Some(CanonicalField::Category),
        "title" => Some(CanonicalField::Title),
        "link" => Some(CanonicalField::Link),
        "price_raw" => Some(CanonicalField::PriceRaw),
        _ => None,
    }
}

fn text<F>(name: &str, records: &[ListingRecord], value: F) -> Column
where
    F: Fn(&ListingRecord) -> Option<String>,
{
    let values: Vec<Option<String>> = records.iter().map(value).collect();
    Column::new(name.into(), values)
}

fn int<F>(name: &str, records: &[ListingRecord], value: F) -> Column
where
    F: Fn(&ListingRecord) -> Option<i64>,
{
    let values: Vec<Option<i64>> = records.iter().map(value).collect();
    Column::new(name.into(), values)
}

fn float<F>(name: &str, records: &[ListingRecord], value: F) -> Column
where
    F: Fn(&ListingRecord) -> Option<f64>,
{
    let values: Vec<Option<f64>> = records.iter().map(value).collect();
    Column::new(name.into(), values)
}

/// Build one output column by name; `None` for names this layout does not know
fn output_column(name: &str, records: &[ListingRecord], scraped_at: NaiveDate) -> Option<Column> {
    let column = match name {
        "rank" => int(name, records, |r| r.parsed.rank),
        "page" => int(name, records, |r| r.parsed.page),
        "category" => text(name, records, |r| r.raw.category.clone()),
        "category_full" => text(name, records, |r| r.parsed.category.category_full.clone()),
        "cat_level_1" => text(name, records, |r| r.parsed.category.cat_level_1.clone()),
        "cat_level_2" => text(name, records, |r| r.parsed.category.cat_level_2.clone()),
        "title" => text(name, records, |r| r.raw.title.clone()),
        "asin" => text(name, records, |r| r.parsed.asin.clone()),
        "link" => text(name, records, |r| r.raw.link.clone()),
        "rating" => float(name, records, |r| r.parsed.rating),
        "review_count" => int(name, records, |r| r.parsed.review_count),
        "price_raw" => text(name, records, |r| r.raw.price_raw.clone()),
        "price_norm" => float(name, records, |r| r.parsed.price_norm),
        "price_segment" => text(name, records, |r| {
            Some(r.features.price_segment.as_str().to_string())
        }),
        "move_pct" => float(name, records, |r| r.parsed.move_pct),
        "sales_rank_now" => float(name, records, |r| r.parsed.sales_rank_now),
        "sales_rank_was" => float(name, records, |r| r.parsed.sales_rank_was),
        "sales_rank_change" => float(name, records, |r| r.features.rank_delta.change),
        "sales_rank_change_abs" => float(name, records, |r| r.features.rank_delta.change_abs),
        "move_direction" => text(name, records, |r| {
            r.features
                .rank_delta
                .direction
                .map(|d| d.as_str().to_string())
        }),
        "review_density" => float(name, records, |r| r.features.review_density),
        "norm_review_density" => float(name, records, |r| r.features.norm_review_density),
        SCRAPED_AT_COLUMN => {
            let stamp = scraped_at.format("%Y-%m-%d").to_string();
            let values: Vec<String> = vec![stamp; records.len()];
            Column::new(name.into(), values)
        }
        _ => return None,
    };
    Some(column)
}

/// Project records onto the ordered output layout of `mode`
pub fn build_output_frame(
    records: &[ListingRecord],
    mapping: &ColumnMapping,
    mode: ProcessingMode,
    scraped_at: NaiveDate,
) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(mode.output_columns().len());

    for &name in mode.output_columns() {
        if let Some(field) = source_field(name) {
            if !mapping.contains(field) {
                debug!("Omitting output column '{}': no source header", name);
                continue;
            }
        }
        if let Some(column) = output_column(name, records, scraped_at) {
            columns.push(column);
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Comma-delimited output writer
#[derive(Debug)]
pub struct CsvOutputWriter {
    output_path: PathBuf,
}

impl CsvOutputWriter {
    /// Create a new writer for `output_path`
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the frame with a header row; returns the number of rows written
    pub fn write(&self, df: &mut DataFrame) -> Result<usize> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::fs::File::create(&self.output_path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(OUTPUT_SEPARATOR)
            .finish(df)
            .map_err(|e| ListingError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: format!("Failed to write CSV output: {}", e),
            })?;

        debug!(
            "Wrote {} rows x {} columns to {}",
            df.height(),
            df.width(),
            self.output_path.display()
        );
        Ok(df.height())
    }
}
