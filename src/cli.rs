//! Command-line interface components.

use crate::config::PipelineConfig;
use crate::constants::LOG_TARGET;
use crate::models::{ProcessingMode, ProcessingStats};
use crate::processor::ListingProcessor;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "listing_processor")]
#[command(about = "Clean a semicolon-delimited marketplace listing export into a typed CSV")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Semicolon-delimited export to clean
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination of the cleaned, comma-delimited file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Export layout to process
    #[arg(long, value_enum, default_value_t = ProcessingMode::BestSellers)]
    pub mode: ProcessingMode,

    /// Date stamped into the scraped_at column (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub scraped_at: Option<NaiveDate>,

    /// Convert rupiah prices to approximate dollars before parsing
    #[arg(long)]
    pub convert_prices: bool,

    /// IDR to USD factor used with --convert-prices
    #[arg(long, value_name = "RATE", requires = "convert_prices")]
    pub idr_rate: Option<f64>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Default configuration for the selected mode with CLI overrides applied
    pub fn to_config(&self) -> crate::Result<PipelineConfig> {
        let mut config = PipelineConfig::for_mode(self.mode);

        if let Some(scraped_at) = self.scraped_at {
            config = config.with_scraped_at(scraped_at);
        }
        if self.convert_prices {
            let rate = self.idr_rate.unwrap_or(config.idr_to_usd_rate);
            config = config.with_price_conversion(rate);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Run one cleaning pass as described by `args`
pub async fn run(args: Args) -> Result<ProcessingStats> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    let config = args.to_config().context("Invalid configuration")?;
    let processor = ListingProcessor::new(config)?;
    info!("Starting {} transform", args.mode);

    let input = args.input.clone();
    let output = args.output.clone();
    let stats = tokio::task::spawn_blocking(move || processor.process_file(&input, &output))
        .await
        .context("Processing task failed")?
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    if !args.quiet {
        print_summary(&stats);
    }
    println!("Saved cleaned file to {}", stats.output_path.display());

    Ok(stats)
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Mode:".bright_cyan(),
        stats.mode.to_string().bright_white()
    );
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Rows written:".bright_cyan(),
        stats.rows_written.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Category groups:".bright_cyan(),
        stats.category_groups.to_string().bright_white()
    );
    if !stats.unmapped_headers.is_empty() {
        println!(
            "  {} {}",
            "Ignored headers:".bright_yellow(),
            stats.unmapped_headers.join(", ").bright_yellow()
        );
    }

    let missing_asin = stats.missing("asin");
    if missing_asin > 0 {
        println!(
            "  {} {}",
            "Rows without ASIN:".bright_yellow(),
            missing_asin.to_string().bright_yellow().bold()
        );
    }
}
