//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Crawl the year, then deduplicate and persist the weeks

pub mod aggregate;
pub mod crawl;

pub use aggregate::{RunStatus, dedup_by_title, finalize};
pub use crawl::{CrawlOutcome, ScheduleCrawler, run_crawler};
