use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hawk_export::api::{Fetcher, HawkClient, ReqwestTransport};
use hawk_export::config::Config;
use hawk_export::export::CsvSink;
use hawk_export::heroes::HeroCatalog;
use hawk_export::workers::{ExclusionFilter, RangeScraper};

/// Export hawk.live Dota 2 matches over a date range with hero matchup deltas
#[derive(Debug, Parser)]
#[command(name = "hawk-export", version)]
struct Args {
    /// First day to scrape (inclusive)
    #[arg(long, env = "HAWK_START", default_value = "2022-01-01")]
    start: NaiveDate,

    /// Last day to scrape (inclusive)
    #[arg(long, env = "HAWK_END", default_value = "2023-01-01")]
    end: NaiveDate,

    /// CSV file to append to
    #[arg(long, short, default_value = "hawk_matches_20220101_20230101.csv")]
    output: PathBuf,

    /// Hero statistics dataset
    #[arg(long, default_value = "cs.json")]
    heroes: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hawk_export=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // .env must be loaded before clap reads HAWK_START / HAWK_END
    dotenvy::dotenv().ok();
    let args = Args::parse();
    if args.end < args.start {
        bail!("--end ({}) is before --start ({})", args.end, args.start);
    }

    info!("Starting hawk-export: {} to {}", args.start, args.end);

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded (base URL: {})", config.base_url);

    // Hero statistics are required before any fetching
    let catalog = HeroCatalog::load_from_file(&args.heroes)
        .with_context(|| format!("Failed to load hero dataset {}", args.heroes.display()))?;

    let transport = ReqwestTransport::new(&config)?;
    let client = HawkClient::new(
        Fetcher::new(transport, config.max_attempts),
        &config.base_url,
        config.page_pacing,
        config.match_pacing,
    );

    let sink = CsvSink::open(&args.output)?;
    let exclusions = ExclusionFilter::new(&config.exclude_keywords);
    let mut scraper = RangeScraper::new(&client, &catalog, exclusions, sink);

    // Rows are flushed as they are written, so an interrupt keeps partial output
    tokio::select! {
        result = scraper.run(args.start, args.end) => {
            let stats = result?;
            info!("Done. {}. Output -> {}", stats, args.output.display());
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, partial output kept in {}", args.output.display());
        }
    }

    Ok(())
}
