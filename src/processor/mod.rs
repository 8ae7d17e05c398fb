//! Main processing engine.
//!
//! Orchestrates one transform run: header mapping, per-row parsing, category
//! decomposition, groupwise statistics, output projection and writing.
//! Parsing is a pure per-row phase; statistics run only once every row has
//! been parsed, over index partitions of the whole table.

pub mod reader;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::reader::read_raw_table;
use self::writer::{CsvOutputWriter, build_output_frame};

use crate::category::decompose;
use crate::config::PipelineConfig;
use crate::constants::INPUT_SEPARATOR;
use crate::currency::convert_price;
use crate::error::Result;
use crate::fields::{parse_float, parse_int, parse_price, parse_rating};
use crate::header::ColumnMapping;
use crate::identifier::extract_asin;
use crate::models::{
    CanonicalRecord, DerivedFeatures, ListingRecord, ParsedRecord, ProcessingStats, RankDelta,
    RawTable,
};
use crate::stats::{
    CategoryGroups, normalize_review_density, rank_delta, review_density, segment_prices,
};

use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of transforming one raw table
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub mapping: ColumnMapping,
    pub records: Vec<ListingRecord>,
    pub category_groups: usize,
}

/// Transform pipeline for one processing mode
#[derive(Debug, Clone)]
pub struct ListingProcessor {
    config: PipelineConfig,
}

impl ListingProcessor {
    /// Create a processor, validating the configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse the typed fields of one canonical record
    pub fn parse_record(&self, raw: &CanonicalRecord) -> ParsedRecord {
        let price_norm = match (self.config.convert_prices, raw.price_raw.as_deref()) {
            (true, Some(text)) => {
                let converted = convert_price(text, self.config.idr_to_usd_rate);
                parse_price(Some(&converted))
            }
            (_, text) => parse_price(text),
        };

        let mut parsed = ParsedRecord {
            rank: parse_int(raw.rank.as_deref()),
            page: parse_int(raw.page.as_deref()),
            asin: extract_asin(raw.link.as_deref()),
            price_norm,
            rating: parse_rating(raw.rating_raw.as_deref()),
            review_count: parse_int(raw.review_count_raw.as_deref()),
            category: decompose(raw.category.as_deref()),
            ..Default::default()
        };

        if self.config.mode.tracks_rank_movement() {
            parsed.move_pct = parse_float(raw.move_pct_raw.as_deref());
            parsed.sales_rank_now = parse_float(raw.sales_rank_now_raw.as_deref());
            parsed.sales_rank_was = parse_float(raw.sales_rank_was_raw.as_deref());
        }

        parsed
    }

    /// Run the whole transform over an in-memory table
    pub fn transform(&self, table: &RawTable) -> TransformOutput {
        let mode = self.config.mode;
        let mapping = ColumnMapping::analyze(&table.headers, mode);
        if !mapping.unmapped_headers().is_empty() {
            warn!(
                "Ignoring unrecognized headers: {}",
                mapping.unmapped_headers().join(", ")
            );
        }

        // Phase 1: per-row projection and parsing
        let canonical: Vec<CanonicalRecord> =
            table.rows.iter().map(|row| mapping.project(row)).collect();
        let parsed: Vec<ParsedRecord> = canonical.iter().map(|r| self.parse_record(r)).collect();

        let densities: Vec<Option<f64>> = parsed
            .iter()
            .map(|p| review_density(p.review_count, p.rank))
            .collect();
        let deltas: Vec<RankDelta> = parsed
            .iter()
            .map(|p| {
                if mode.tracks_rank_movement() {
                    rank_delta(p.sales_rank_was, p.sales_rank_now)
                } else {
                    RankDelta::default()
                }
            })
            .collect();

        // Phase 2: groupwise statistics
        let groups =
            CategoryGroups::partition(parsed.iter().map(|p| p.category.cat_level_1.as_deref()));
        let prices: Vec<Option<f64>> = parsed.iter().map(|p| p.price_norm).collect();
        let segments = segment_prices(
            &prices,
            &groups,
            self.config.low_quantile,
            self.config.high_quantile,
        );
        let normalized =
            normalize_review_density(&densities, &groups, self.config.effective_policy());

        debug!(
            "Computed statistics for {} rows across {} category groups",
            parsed.len(),
            groups.len()
        );

        let records = canonical
            .into_iter()
            .zip(parsed)
            .enumerate()
            .map(|(i, (raw, parsed))| ListingRecord {
                raw,
                parsed,
                features: DerivedFeatures {
                    price_segment: segments[i],
                    review_density: densities[i],
                    norm_review_density: normalized[i],
                    rank_delta: deltas[i],
                },
            })
            .collect();

        TransformOutput {
            mapping,
            records,
            category_groups: groups.len(),
        }
    }

    /// Project a transform result onto this mode's output layout
    pub fn to_frame(&self, output: &TransformOutput) -> Result<DataFrame> {
        build_output_frame(
            &output.records,
            &output.mapping,
            self.config.mode,
            self.config.scraped_at,
        )
    }

    /// Read `input_path`, transform it and write the cleaned file to `output_path`
    pub fn process_file(&self, input_path: &Path, output_path: &Path) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        info!(
            "Transforming {} ({} mode)",
            input_path.display(),
            self.config.mode
        );

        let table = read_raw_table(input_path, INPUT_SEPARATOR)?;
        let output = self.transform(&table);

        let mut df = self.to_frame(&output)?;
        let rows_written = CsvOutputWriter::new(output_path).write(&mut df)?;

        let stats = ProcessingStats {
            mode: self.config.mode,
            rows_read: table.len(),
            rows_written,
            category_groups: output.category_groups,
            mapped_fields: output
                .mapping
                .mapped_fields()
                .iter()
                .map(|f| f.to_string())
                .collect(),
            unmapped_headers: output.mapping.unmapped_headers().to_vec(),
            missing_counts: missing_counts(&output.records, self.config.mode.tracks_rank_movement()),
            output_path: output_path.to_path_buf(),
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        debug!("Missing values per field: {:?}", stats.missing_counts);
        info!(
            "Wrote {} rows ({} category groups) to {} in {}ms",
            stats.rows_written,
            stats.category_groups,
            output_path.display(),
            stats.processing_time_ms
        );

        Ok(stats)
    }
}

fn count_missing(records: &[ListingRecord], is_missing: fn(&ListingRecord) -> bool) -> usize {
    records.iter().filter(|r| is_missing(r)).count()
}

/// Count rows whose parsed or derived value ended up missing, per field
fn missing_counts(records: &[ListingRecord], rank_movement: bool) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    let mut record = |field: &str, missing: usize| {
        counts.insert(field.to_string(), missing);
    };

    record("rank", count_missing(records, |r| r.parsed.rank.is_none()));
    record("asin", count_missing(records, |r| r.parsed.asin.is_none()));
    record("price_norm", count_missing(records, |r| r.parsed.price_norm.is_none()));
    record("rating", count_missing(records, |r| r.parsed.rating.is_none()));
    record("review_count", count_missing(records, |r| r.parsed.review_count.is_none()));
    record(
        "cat_level_1",
        count_missing(records, |r| r.parsed.category.cat_level_1.is_none()),
    );
    record(
        "review_density",
        count_missing(records, |r| r.features.review_density.is_none()),
    );

    if rank_movement {
        record("move_pct", count_missing(records, |r| r.parsed.move_pct.is_none()));
        record(
            "sales_rank_change",
            count_missing(records, |r| r.features.rank_delta.change.is_none()),
        );
    }

    counts
}
