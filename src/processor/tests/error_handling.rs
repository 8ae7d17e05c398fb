//! Error handling tests
//!
//! Malformed cells must never fail a run; only unreadable input and
//! invalid configuration do.

use crate::config::PipelineConfig;
use crate::error::ListingError;
use crate::models::{PriceSegment, ProcessingMode, RawTable};
use crate::processor::ListingProcessor;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_missing_input_file() {
    let temp_dir = TempDir::new().unwrap();
    let processor = ListingProcessor::new(PipelineConfig::default()).unwrap();

    let result = processor.process_file(
        Path::new("/nonexistent/best_sellers.csv"),
        &temp_dir.path().join("out.csv"),
    );

    match result {
        Err(ListingError::InputNotFound { path }) => {
            assert_eq!(path, Path::new("/nonexistent/best_sellers.csv"));
        }
        _ => panic!("Expected InputNotFound error"),
    }
    assert!(!temp_dir.path().join("out.csv").exists());
}

#[test]
fn test_invalid_configuration_rejected() {
    let config = PipelineConfig::default().with_quantiles(0.9, 0.1);

    match ListingProcessor::new(config) {
        Err(ListingError::Configuration { message }) => {
            assert!(message.contains("exceeds"));
        }
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_malformed_values_become_missing() {
    let table = RawTable::from_strs(
        &["rank", "category", "link", "rating", "review_count", "price"],
        &[
            &["first", "", "https://example.com/item", "five stars", "lots", "N/A"],
            &["", "Best Sellers in", "", "4 out of 5", "", "call for price"],
            &["99999999999999999999", "Best Sellers in Garden", "B0XXXXXXXX", "4.0", "3", "$1.00"],
        ],
    );
    let processor = ListingProcessor::new(PipelineConfig::default()).unwrap();
    let output = processor.transform(&table);

    assert_eq!(output.records.len(), 3);
    for record in &output.records[..2] {
        assert_eq!(record.parsed.rank, None);
        assert_eq!(record.parsed.asin, None);
        assert_eq!(record.parsed.rating, None);
        assert_eq!(record.parsed.review_count, None);
        assert_eq!(record.parsed.price_norm, None);
        assert_eq!(record.features.review_density, None);
        assert_eq!(record.features.price_segment, PriceSegment::Unknown);
    }

    // overflowing rank is missing, the rest of the row still parses
    let last = &output.records[2];
    assert_eq!(last.parsed.rank, None);
    assert_eq!(last.parsed.rating, Some(4.0));
    assert_eq!(last.parsed.price_norm, Some(1.0));
    assert_eq!(last.features.review_density, None);
}

#[test]
fn test_zero_rank_density_is_missing() {
    let table = RawTable::from_strs(
        &["rank", "category", "review_count"],
        &[
            &["0", "Best Sellers in Garden", "10"],
            &["1", "Best Sellers in Garden", "10"],
        ],
    );
    let processor = ListingProcessor::new(PipelineConfig::default()).unwrap();
    let output = processor.transform(&table);

    assert_eq!(output.records[0].features.review_density, None);
    assert_eq!(output.records[1].features.review_density, Some(10.0));
    // a single distinct density means zero spread: the whole group is 0.0
    assert_eq!(output.records[0].features.norm_review_density, Some(0.0));
    assert_eq!(output.records[1].features.norm_review_density, Some(0.0));
}

#[test]
fn test_header_only_input_writes_header_only_output() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("empty.csv");
    let output_path = temp_dir.path().join("empty_clean.csv");
    fs::write(&input_path, "rank;title;price\n").unwrap();

    let processor = ListingProcessor::new(PipelineConfig::default()).unwrap();
    let stats = processor.process_file(&input_path, &output_path).unwrap();

    assert_eq!(stats.rows_read, 0);
    assert_eq!(stats.rows_written, 0);
    assert_eq!(stats.category_groups, 0);

    let content = fs::read_to_string(&output_path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.starts_with("rank,category_full,"));
}

#[test]
fn test_unrecognized_headers_are_reported() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("odd.csv");
    let output_path = temp_dir.path().join("odd_clean.csv");
    fs::write(&input_path, "rank;seller;title\n1;Acme;Widget\n").unwrap();

    let processor =
        ListingProcessor::new(PipelineConfig::for_mode(ProcessingMode::BestSellers)).unwrap();
    let stats = processor.process_file(&input_path, &output_path).unwrap();

    assert_eq!(stats.unmapped_headers, vec!["seller".to_string()]);
    assert!(stats.mapped_fields.contains(&"title".to_string()));
    assert_eq!(stats.missing("asin"), 1);
}
