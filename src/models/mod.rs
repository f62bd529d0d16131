// src/models/mod.rs

//! Domain models for the crawler application.

mod config;
mod meeting;

// Re-export all public types
pub use config::{Config, CrawlerConfig, FilterConfig, OutputConfig, SelectorConfig, SiteConfig};
pub use meeting::{MeetingWeek, Part, Section};

/// Counters collected over one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub months_found: usize,
    pub months_failed: usize,
    pub week_links: usize,
    pub weeks_failed: usize,
    pub weeks_skipped: usize,
    pub records: usize,
}

impl CrawlStats {
    pub fn started_now() -> Self {
        let now = chrono::Utc::now();
        Self {
            start_time: now,
            end_time: now,
            months_found: 0,
            months_failed: 0,
            week_links: 0,
            weeks_failed: 0,
            weeks_skipped: 0,
            records: 0,
        }
    }

    /// Wall-clock duration of the run in seconds.
    pub fn elapsed_secs(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }
}
