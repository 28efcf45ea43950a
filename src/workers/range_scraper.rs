use std::fmt;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::api::hawk::{ListingProps, Series, SeriesMatch};
use crate::api::{HawkClient, Transport};
use crate::enrich::{enrich, MatchContext};
use crate::export::RecordSink;
use crate::heroes::HeroCatalog;
use crate::progress::Progress;
use crate::workers::ExclusionFilter;

/// Counters for one export run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub rows_written: usize,
    pub excluded: usize,
    pub skipped: usize,
    pub failed_days: usize,
    pub failed_matches: usize,
    pub days_processed: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows written, {} series excluded, {} matches skipped, {} days processed, {} days failed, {} matches failed",
            self.rows_written,
            self.excluded,
            self.skipped,
            self.days_processed,
            self.failed_days,
            self.failed_matches
        )
    }
}

/// Walks a date range day by day and streams enriched matches into a sink
pub struct RangeScraper<'a, T, S> {
    client: &'a HawkClient<T>,
    catalog: &'a HeroCatalog,
    exclusions: ExclusionFilter,
    sink: S,
}

impl<'a, T: Transport, S: RecordSink> RangeScraper<'a, T, S> {
    pub fn new(
        client: &'a HawkClient<T>,
        catalog: &'a HeroCatalog,
        exclusions: ExclusionFilter,
        sink: S,
    ) -> Self {
        Self {
            client,
            catalog,
            exclusions,
            sink,
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Scrape every day from `start` to `end`, both inclusive
    ///
    /// Day and match failures are logged and counted. Only sink errors abort.
    pub async fn run(&mut self, start: NaiveDate, end: NaiveDate) -> Result<RunStats> {
        if end < start {
            bail!("End date {} is before start date {}", end, start);
        }

        let total_days = (end - start).num_days() as usize + 1;
        let mut progress = Progress::new(total_days);
        let mut stats = RunStats::default();

        info!("Scraping {} day(s) from {} to {}", total_days, start, end);

        for day in start.iter_days().take_while(|d| *d <= end) {
            match self.client.fetch_listing(day).await {
                Ok(listing) => {
                    self.scrape_listing(day, &listing, &mut stats).await?;
                    stats.days_processed += 1;
                }
                Err(e) => {
                    warn!("Skipping day {}: {}", day, e);
                    stats.failed_days += 1;
                }
            }

            progress.advance();
            info!("{}", progress.render());
            info!(
                "Processed {} - rows total: {}, excluded: {}, skipped: {}",
                day, stats.rows_written, stats.excluded, stats.skipped
            );
        }

        Ok(stats)
    }

    async fn scrape_listing(
        &mut self,
        day: NaiveDate,
        listing: &ListingProps,
        stats: &mut RunStats,
    ) -> Result<()> {
        debug!("{}: {} series listed", day, listing.series.len());

        for series in &listing.series {
            if let Some(keyword) = self.exclusions.matching_keyword(series.championship()) {
                debug!(
                    "Excluding series {:?} ({}): matches keyword '{}'",
                    series.id,
                    series.championship(),
                    keyword
                );
                stats.excluded += 1;
                continue;
            }

            for listed in series.matches_in_order() {
                self.scrape_match(day, series, listed, stats).await?;
            }
        }

        Ok(())
    }

    async fn scrape_match(
        &mut self,
        day: NaiveDate,
        series: &Series,
        listed: &SeriesMatch,
        stats: &mut RunStats,
    ) -> Result<()> {
        let Some(match_id) = listed.id.filter(|id| *id != 0) else {
            return Ok(());
        };

        let props = match self.client.fetch_match(match_id).await {
            Ok(props) => props,
            Err(e) => {
                warn!("Failed to fetch match {}: {}", match_id, e);
                stats.failed_matches += 1;
                return Ok(());
            }
        };

        let ctx = MatchContext {
            date: day,
            championship: series.championship(),
            series_id: series.id,
            map_number: listed.number,
            match_id,
            team1: series.team1_name(),
            team2: series.team2_name(),
            listed_heroes: &listed.heroes,
        };

        match enrich(&ctx, &props, self.catalog) {
            Ok(record) => {
                self.sink.write_record(&record)?;
                stats.rows_written += 1;
            }
            Err(reason) => {
                debug!("Skipping match {}: {}", match_id, reason);
                stats.skipped += 1;
            }
        }

        Ok(())
    }
}
