//! Configuration management and validation.
//!
//! Provides the pipeline configuration: processing mode, output date stamp,
//! price segmentation quantiles, normalization policy and the optional
//! rupiah pre-conversion.

use crate::constants::{
    DEFAULT_HIGH_QUANTILE, DEFAULT_LOW_QUANTILE, DEFAULT_SCRAPED_AT, IDR_TO_USD,
};
use crate::error::{ListingError, Result};
use crate::models::{NormalizationPolicy, ProcessingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for one transform run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Which export layout and rule set to apply
    pub mode: ProcessingMode,

    /// Date written to the `scraped_at` column of every row
    pub scraped_at: NaiveDate,

    /// Quantile at or below which a price is "Low"
    pub low_quantile: f64,

    /// Quantile at or below which a price is "Mid"
    pub high_quantile: f64,

    /// Review density normalization policy; `None` uses the mode default
    pub normalization_policy: Option<NormalizationPolicy>,

    /// Rewrite rupiah prices to approximate dollars before parsing
    pub convert_prices: bool,

    /// Static IDR to USD factor used when `convert_prices` is set
    pub idr_to_usd_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::default(),
            scraped_at: default_scraped_at(),
            low_quantile: DEFAULT_LOW_QUANTILE,
            high_quantile: DEFAULT_HIGH_QUANTILE,
            normalization_policy: None,
            convert_prices: false,
            idr_to_usd_rate: IDR_TO_USD,
        }
    }
}

fn default_scraped_at() -> NaiveDate {
    NaiveDate::parse_from_str(DEFAULT_SCRAPED_AT, "%Y-%m-%d")
        .unwrap_or(NaiveDate::MIN)
}

impl PipelineConfig {
    /// Default configuration for a processing mode
    pub fn for_mode(mode: ProcessingMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set the processing mode
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the `scraped_at` date
    pub fn with_scraped_at(mut self, scraped_at: NaiveDate) -> Self {
        self.scraped_at = scraped_at;
        self
    }

    /// Set the price segmentation quantiles
    pub fn with_quantiles(mut self, low: f64, high: f64) -> Self {
        self.low_quantile = low;
        self.high_quantile = high;
        self
    }

    /// Force a normalization policy regardless of mode
    pub fn with_normalization_policy(mut self, policy: NormalizationPolicy) -> Self {
        self.normalization_policy = Some(policy);
        self
    }

    /// Enable rupiah pre-conversion with the given factor
    pub fn with_price_conversion(mut self, idr_to_usd_rate: f64) -> Self {
        self.convert_prices = true;
        self.idr_to_usd_rate = idr_to_usd_rate;
        self
    }

    /// Policy in effect for this run
    pub fn effective_policy(&self) -> NormalizationPolicy {
        self.normalization_policy
            .unwrap_or_else(|| self.mode.default_normalization_policy())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let in_unit = |q: f64| (0.0..=1.0).contains(&q);
        if !in_unit(self.low_quantile) || !in_unit(self.high_quantile) {
            return Err(ListingError::Configuration {
                message: format!(
                    "Quantiles must lie in [0, 1], got low={} high={}",
                    self.low_quantile, self.high_quantile
                ),
            });
        }

        if self.low_quantile > self.high_quantile {
            return Err(ListingError::Configuration {
                message: format!(
                    "Low quantile {} exceeds high quantile {}",
                    self.low_quantile, self.high_quantile
                ),
            });
        }

        if self.convert_prices && !(self.idr_to_usd_rate.is_finite() && self.idr_to_usd_rate > 0.0)
        {
            return Err(ListingError::Configuration {
                message: format!(
                    "IDR to USD rate must be a positive number, got {}",
                    self.idr_to_usd_rate
                ),
            });
        }

        debug!(
            "Configuration valid: mode={}, policy={:?}, quantiles=({}, {})",
            self.mode,
            self.effective_policy(),
            self.low_quantile,
            self.high_quantile
        );
        Ok(())
    }
}
