// src/pipeline/crawl.rs

//! Schedule crawling pipeline.
//!
//! Year index → month pages → week pages, strictly sequential, with a fixed
//! pause after every week page.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, CrawlStats, MeetingWeek};
use crate::pipeline::aggregate::{RunStatus, finalize};
use crate::services::{
    LinkExtractor, SkipReason, WeekOutcome, WeekParser, WeekRules, month_filter, week_filter,
};
use crate::storage::ScheduleStorage;
use crate::utils::http::{Fetcher, PageSource, RetryPolicy};
use crate::utils::url_label;

/// Weeks gathered by a crawl, in discovery order and possibly duplicated.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub weeks: Vec<MeetingWeek>,
    pub stats: CrawlStats,
}

/// Walks the site hierarchy and collects week records.
pub struct ScheduleCrawler<S> {
    config: Arc<Config>,
    fetcher: Fetcher<S>,
    links: LinkExtractor,
    parser: WeekParser,
}

impl<S: PageSource> ScheduleCrawler<S> {
    /// Create a crawler over `source` using the configured retry policy,
    /// selectors and filters.
    pub fn new(config: Arc<Config>, source: S) -> Result<Self> {
        let fetcher = Fetcher::new(source, RetryPolicy::from_config(&config.crawler));
        let links = LinkExtractor::new(&config.site.base_url, &config.selectors.directory_link)?;
        let parser = WeekParser::new(
            &config.selectors.week_title,
            WeekRules::from_config(&config.filters)?,
        )?;

        Ok(Self {
            config,
            fetcher,
            links,
            parser,
        })
    }

    /// Replace the week page heuristics.
    pub fn with_rules(mut self, rules: WeekRules) -> Result<Self> {
        self.parser = WeekParser::new(&self.config.selectors.week_title, rules)?;
        Ok(self)
    }

    /// Crawl the whole year.
    ///
    /// Fails only when the year index cannot be fetched; month and week
    /// failures are logged and skipped.
    pub async fn crawl(&self) -> Result<CrawlOutcome> {
        let mut stats = CrawlStats::started_now();
        let mut weeks = Vec::new();

        let index_url = &self.config.site.index_url;
        log::info!("Fetching year index {}", index_url);
        let index = self.fetcher.fetch(index_url).await.inspect_err(|e| {
            log::error!("Cannot read the year index: {}", e);
        })?;

        let months = self
            .links
            .extract(&index, month_filter(&self.config.site.month_path_segment));
        stats.months_found = months.len();
        if months.is_empty() {
            log::warn!("No month links found on the year index");
        } else {
            log::info!("Months found: {}", months.len());
        }

        for month_url in &months {
            self.crawl_month(month_url, &mut weeks, &mut stats).await;
        }

        stats.records = weeks.len();
        stats.end_time = Utc::now();
        Ok(CrawlOutcome { weeks, stats })
    }

    async fn crawl_month(
        &self,
        month_url: &str,
        weeks: &mut Vec<MeetingWeek>,
        stats: &mut CrawlStats,
    ) {
        let label = url_label(month_url).to_uppercase();
        log::info!("Opening month {}", label);

        let page = match self.fetcher.fetch(month_url).await {
            Ok(page) => page,
            Err(e) => {
                stats.months_failed += 1;
                log::warn!("Could not open month {}: {}", label, e);
                return;
            }
        };

        let week_urls = self
            .links
            .extract(&page, week_filter(&self.config.site.cover_label));
        stats.week_links += week_urls.len();
        log::info!("Month {}: {} week link(s)", label, week_urls.len());

        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        for week_url in &week_urls {
            match self.fetcher.fetch(week_url).await {
                Ok(page) => match self.parser.parse(&page) {
                    WeekOutcome::Week(week) => {
                        log::info!(
                            "  OK {} ({} sections, {} parts)",
                            week.title,
                            week.sections.len(),
                            week.part_count()
                        );
                        weeks.push(week);
                    }
                    WeekOutcome::Skip(SkipReason::SpecialWeek(title)) => {
                        stats.weeks_skipped += 1;
                        log::info!("  SKIP special week: {}", title);
                    }
                    WeekOutcome::Skip(SkipReason::NotAWeekPage) => {
                        stats.weeks_skipped += 1;
                        log::info!("  SKIP no week heading: {}", week_url);
                    }
                },
                Err(e) => {
                    stats.weeks_failed += 1;
                    log::warn!("  FAIL {}: {}", week_url, e);
                }
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Run the schedule crawler and persist the result.
pub async fn run_crawler<S: PageSource>(
    config: Arc<Config>,
    source: S,
    storage: &dyn ScheduleStorage,
) -> Result<RunStatus> {
    let crawler = ScheduleCrawler::new(config, source)?;
    let outcome = crawler.crawl().await?;
    log_summary(&outcome.stats);

    finalize(outcome.weeks, storage).await
}

fn log_summary(stats: &CrawlStats) {
    log::info!("[SUMMARY] Crawl finished in {}s", stats.elapsed_secs());
    log::info!(
        "    Months: {} found, {} failed",
        stats.months_found,
        stats.months_failed
    );
    log::info!(
        "    Weeks: {} links, {} failed, {} skipped",
        stats.week_links,
        stats.weeks_failed,
        stats.weeks_skipped
    );
    log::info!("    Records: {}", stats.records);
}
