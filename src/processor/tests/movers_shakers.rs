//! Movers & shakers pipeline tests

use crate::config::PipelineConfig;
use crate::models::{MoveDirection, NormalizationPolicy, ProcessingMode, RawTable};
use crate::processor::ListingProcessor;
use std::fs;
use tempfile::TempDir;

const HEADERS: &[&str] = &[
    "Rank",
    "Category",
    "Title",
    "Link",
    "Rating",
    "Reviews",
    "Price",
    "Move %",
    "Sales_Rank_Now",
    "Sales_Rank_Was",
];

fn processor() -> ListingProcessor {
    ListingProcessor::new(PipelineConfig::for_mode(ProcessingMode::MoversShakers)).unwrap()
}

fn sample_table() -> RawTable {
    RawTable::from_strs(
        HEADERS,
        &[
            &[
                "1",
                "Movers & Shakers in Toys & Games",
                "Puzzle",
                "https://www.amazon.com/dp/B0ABCDE123/ref=zg_bsms_1",
                "4.7 out of 5 stars",
                "100",
                "$10.00",
                "+1,250%",
                "50",
                "1,000",
            ],
            &[
                "2",
                "Movers & Shakers in Toys & Games",
                "Kite",
                "https://www.amazon.com/dp/B0ABCDE124",
                "4.2 out of 5 stars",
                "40",
                "$25.00",
                "310%",
                "300",
                "200",
            ],
            &[
                "3",
                "Movers & Shakers in Books",
                "Atlas",
                "https://www.amazon.com/dp/B0ABCDE125",
                "",
                "",
                "$12.00",
                "",
                "7",
                "7",
            ],
            &[
                "4",
                "Movers & Shakers in Toys & Games",
                "Yo-yo",
                "https://www.amazon.com/dp/B0ABCDE126",
                "3.9 out of 5 stars",
                "8",
                "$3.00",
                "95%",
                "",
                "10",
            ],
        ],
    )
}

#[test]
fn test_movement_headers_mapped() {
    let output = processor().transform(&sample_table());
    assert!(output.mapping.unmapped_headers().is_empty());

    let first = &output.records[0].parsed;
    assert_eq!(first.rank, Some(1));
    assert_eq!(first.move_pct, Some(1250.0));
    assert_eq!(first.sales_rank_now, Some(50.0));
    assert_eq!(first.sales_rank_was, Some(1000.0));
    assert_eq!(first.category.category_full.as_deref(), Some("Toys & Games"));
    assert_eq!(first.category.cat_level_1.as_deref(), Some("Toys"));
    assert_eq!(first.category.cat_level_2.as_deref(), Some("Games"));
}

#[test]
fn test_rank_delta_direction_convention() {
    let output = processor().transform(&sample_table());
    let deltas: Vec<_> = output.records.iter().map(|r| r.features.rank_delta).collect();

    // rank number fell from 1000 to 50: the item moved up
    assert_eq!(deltas[0].change, Some(950.0));
    assert_eq!(deltas[0].change_abs, Some(950.0));
    assert_eq!(deltas[0].direction, Some(MoveDirection::Up));

    assert_eq!(deltas[1].change, Some(-100.0));
    assert_eq!(deltas[1].change_abs, Some(100.0));
    assert_eq!(deltas[1].direction, Some(MoveDirection::Down));

    assert_eq!(deltas[2].change, Some(0.0));
    assert_eq!(deltas[2].direction, Some(MoveDirection::NoChange));

    // current rank missing
    assert_eq!(deltas[3].change, None);
    assert_eq!(deltas[3].change_abs, None);
    assert_eq!(deltas[3].direction, None);
}

#[test]
fn test_min_sample_guard() {
    let output = processor().transform(&sample_table());
    let norm: Vec<_> = output
        .records
        .iter()
        .map(|r| r.features.norm_review_density)
        .collect();

    // Toys densities 100, 20, 2
    assert_eq!(norm[0], Some(1.0));
    assert!((norm[1].unwrap() - 18.0 / 98.0).abs() < 1e-12);
    assert_eq!(norm[3], Some(0.0));
    // Books has no usable density at all
    assert_eq!(output.records[2].features.review_density, None);
    assert_eq!(norm[2], Some(0.0));
}

#[test]
fn test_policy_override() {
    let config = PipelineConfig::for_mode(ProcessingMode::MoversShakers)
        .with_normalization_policy(NormalizationPolicy::ZeroSpreadGuard);
    let output = ListingProcessor::new(config)
        .unwrap()
        .transform(&sample_table());

    // an all-missing group stays missing under the zero-spread policy
    assert_eq!(output.records[2].features.norm_review_density, None);
    assert_eq!(output.records[0].features.norm_review_density, Some(1.0));
}

#[test]
fn test_rank_now_header_is_listing_rank() {
    let table = RawTable::from_strs(
        &["Rank Now", "Sales Rank Now", "Sales Rank Was"],
        &[&["5", "120", "480"]],
    );
    let output = processor().transform(&table);
    let parsed = &output.records[0].parsed;

    assert_eq!(parsed.rank, Some(5));
    assert_eq!(parsed.sales_rank_now, Some(120.0));
    assert_eq!(parsed.sales_rank_was, Some(480.0));
    assert_eq!(
        output.records[0].features.rank_delta.direction,
        Some(MoveDirection::Up)
    );
}

#[test]
fn test_movers_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("movers.csv");
    let output_path = temp_dir.path().join("movers_clean.csv");

    let csv_content = "\
Rank;Title;Link;Price;Move %;Sales_Rank_Now;Sales_Rank_Was
1;Puzzle;https://www.amazon.com/dp/B0ABCDE123/;$10.00;+250%;50;200
2;Kite;https://www.amazon.com/dp/B0ABCDE124/;$25.00;80%;300;200
";
    fs::write(&input_path, csv_content).unwrap();

    let stats = processor().process_file(&input_path, &output_path).unwrap();
    assert_eq!(stats.mode, ProcessingMode::MoversShakers);
    assert_eq!(stats.rows_written, 2);
    assert_eq!(stats.missing("sales_rank_change"), 0);
    assert_eq!(stats.missing("move_pct"), 0);

    let content = fs::read_to_string(&output_path).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(
        header,
        "rank,category_full,cat_level_1,cat_level_2,title,asin,link,rating,review_count,\
         price_raw,price_norm,price_segment,move_pct,sales_rank_now,sales_rank_was,\
         sales_rank_change,sales_rank_change_abs,move_direction,review_density,\
         norm_review_density,scraped_at"
    );

    let rows: Vec<&str> = content.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].contains(",up,"));
    assert!(rows[1].contains(",down,"));
}
