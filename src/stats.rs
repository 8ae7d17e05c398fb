//! Groupwise statistics over parsed listings.
//!
//! Rows are partitioned by `cat_level_1` into index lists (rows without a
//! level-1 category share one group). Each group's quantiles and min/max are
//! computed from that group alone, and results are written back by row index
//! so input order is untouched.

use crate::models::{MoveDirection, NormalizationPolicy, PriceSegment, RankDelta};
use std::collections::HashMap;
use tracing::debug;

/// Row indices per `cat_level_1` value
#[derive(Debug, Clone, Default)]
pub struct CategoryGroups {
    groups: HashMap<Option<String>, Vec<usize>>,
}

impl CategoryGroups {
    /// Partition row indices by group key, in row order
    pub fn partition<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut groups: HashMap<Option<String>, Vec<usize>> = HashMap::new();
        for (index, key) in keys.into_iter().enumerate() {
            groups.entry(key.map(str::to_string)).or_default().push(index);
        }
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Row indices of one group
    pub fn members(&self, key: Option<&str>) -> Option<&[usize]> {
        self.groups
            .get(&key.map(str::to_string))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &[usize])> {
        self.groups
            .iter()
            .map(|(key, rows)| (key.as_deref(), rows.as_slice()))
    }
}

/// Quantile of ascending-sorted values using linear interpolation between
/// the closest ranks (position `q * (n - 1)`).
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Bucket one price against its group's `(low, high)` thresholds
pub fn classify_price(price: Option<f64>, thresholds: Option<(f64, f64)>) -> PriceSegment {
    match (price, thresholds) {
        (Some(price), Some((low, high))) => {
            if price <= low {
                PriceSegment::Low
            } else if price <= high {
                PriceSegment::Mid
            } else {
                PriceSegment::High
            }
        }
        _ => PriceSegment::Unknown,
    }
}

/// Price segment of every row, using quantiles of its own category group
pub fn segment_prices(
    prices: &[Option<f64>],
    groups: &CategoryGroups,
    low_quantile: f64,
    high_quantile: f64,
) -> Vec<PriceSegment> {
    let mut segments = vec![PriceSegment::Unknown; prices.len()];

    for (key, rows) in groups.iter() {
        let mut present: Vec<f64> = rows.iter().filter_map(|&i| prices[i]).collect();
        present.sort_by(f64::total_cmp);

        let thresholds = quantile(&present, low_quantile)
            .zip(quantile(&present, high_quantile));
        if thresholds.is_none() {
            debug!("Category group {:?} has no prices; segments unknown", key);
        }

        for &i in rows {
            segments[i] = classify_price(prices[i], thresholds);
        }
    }

    segments
}

/// Reviews per rank position; missing unless both are present and rank > 0
pub fn review_density(review_count: Option<i64>, rank: Option<i64>) -> Option<f64> {
    match (review_count, rank) {
        (Some(count), Some(rank)) if rank > 0 => Some(count as f64 / rank as f64),
        _ => None,
    }
}

/// Min-max normalize review densities within each category group
pub fn normalize_review_density(
    densities: &[Option<f64>],
    groups: &CategoryGroups,
    policy: NormalizationPolicy,
) -> Vec<Option<f64>> {
    let mut normalized = vec![None; densities.len()];

    for (_, rows) in groups.iter() {
        let present: Vec<f64> = rows.iter().filter_map(|&i| densities[i]).collect();

        match policy {
            NormalizationPolicy::ZeroSpreadGuard if present.is_empty() => continue,
            NormalizationPolicy::MinSampleGuard if present.len() < 2 => {
                fill(&mut normalized, rows, Some(0.0));
                continue;
            }
            _ => {}
        }

        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;

        if spread == 0.0 {
            fill(&mut normalized, rows, Some(0.0));
            continue;
        }

        for &i in rows {
            normalized[i] = densities[i].map(|value| (value - min) / spread);
        }
    }

    normalized
}

fn fill(target: &mut [Option<f64>], rows: &[usize], value: Option<f64>) {
    for &i in rows {
        target[i] = value;
    }
}

/// Sales rank movement from the previous to the current observation
pub fn rank_delta(sales_rank_was: Option<f64>, sales_rank_now: Option<f64>) -> RankDelta {
    let change = sales_rank_was
        .zip(sales_rank_now)
        .map(|(was, now)| was - now);

    RankDelta {
        change,
        change_abs: change.map(f64::abs),
        direction: change.and_then(move_direction),
    }
}

/// `Up` when the rank number decreased (a positive change)
pub fn move_direction(change: f64) -> Option<MoveDirection> {
    if change > 0.0 {
        Some(MoveDirection::Up)
    } else if change < 0.0 {
        Some(MoveDirection::Down)
    } else if change == 0.0 {
        Some(MoveDirection::NoChange)
    } else {
        None
    }
}
