//! Application configuration structures.

use std::fs;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Site entry points and link filtering
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors for index and week pages
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Textual heuristics applied to week pages
    #[serde(default)]
    pub filters: FilterConfig,

    /// Where the schedule is written
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_attempts == 0 {
            return Err(AppError::validation("crawler.max_attempts must be > 0"));
        }

        Url::parse(&self.site.base_url)
            .map_err(|e| AppError::validation(format!("site.base_url: {e}")))?;
        Url::parse(&self.site.index_url)
            .map_err(|e| AppError::validation(format!("site.index_url: {e}")))?;
        if self.site.month_path_segment.trim().is_empty() {
            return Err(AppError::validation("site.month_path_segment is empty"));
        }

        for selector in [&self.selectors.directory_link, &self.selectors.week_title] {
            Selector::parse(selector)
                .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }

        Regex::new(&self.filters.duration_pattern)
            .map_err(|e| AppError::validation(format!("filters.duration_pattern: {e}")))?;

        if self.output.path.trim().is_empty() {
            return Err(AppError::validation("output.path is empty"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Total attempts per page, including the first
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Pause between failed attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// Pause after every week page in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_attempts: defaults::max_attempts(),
            retry_delay_ms: defaults::retry_delay(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Site entry points.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin used to resolve relative links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Year index page listing the monthly workbooks
    #[serde(default = "defaults::index_url")]
    pub index_url: String,

    /// Path segment every month link of the current year contains
    #[serde(default = "defaults::month_path_segment")]
    pub month_path_segment: String,

    /// Link text of the month's own cover entry
    #[serde(default = "defaults::cover_label")]
    pub cover_label: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            index_url: defaults::index_url(),
            month_path_segment: defaults::month_path_segment(),
            cover_label: defaults::cover_label(),
        }
    }
}

/// CSS selectors.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Anchors of the directory listing on year and month index pages
    #[serde(default = "defaults::directory_link")]
    pub directory_link: String,

    /// Primary heading of a week page
    #[serde(default = "defaults::week_title")]
    pub week_title: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            directory_link: defaults::directory_link(),
            week_title: defaults::week_title(),
        }
    }
}

/// Textual heuristics for week pages.
///
/// Token lists are matched case-insensitively as substrings.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Week titles containing any of these are commemorations, not meetings
    #[serde(default = "defaults::special_week_tokens")]
    pub special_week_tokens: Vec<String>,

    /// Level-2 headings containing any of these are captions, not sections
    #[serde(default = "defaults::section_skip_tokens")]
    pub section_skip_tokens: Vec<String>,

    /// Literal phrase marking parts with a running counter (case-sensitive)
    #[serde(default = "defaults::counter_marker")]
    pub counter_marker: String,

    /// Regex with one capture group for the minutes
    #[serde(default = "defaults::duration_pattern")]
    pub duration_pattern: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            special_week_tokens: defaults::special_week_tokens(),
            section_skip_tokens: defaults::section_skip_tokens(),
            counter_marker: defaults::counter_marker(),
            duration_pattern: defaults::duration_pattern(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// JSON file receiving the deduplicated schedule
    #[serde(default = "defaults::output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; apostila-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        3000
    }
    pub fn request_delay() -> u64 {
        1000
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://wol.jw.org".into()
    }
    pub fn index_url() -> String {
        "https://wol.jw.org/pt/wol/library/r5/lp-t/todas-as-publicações/apostilas/apostila-vida-e-ministério-2026".into()
    }
    pub fn month_path_segment() -> String {
        "/apostila-vida-e-ministério-2026/".into()
    }
    pub fn cover_label() -> String {
        "Apostila da Reunião".into()
    }

    // Selector defaults
    pub fn directory_link() -> String {
        "ul.directory li.row a".into()
    }
    pub fn week_title() -> String {
        "h1#p1".into()
    }

    // Filter defaults
    pub fn special_week_tokens() -> Vec<String> {
        vec!["CELEBRAÇÃO".into(), "MEMORIAL".into()]
    }
    pub fn section_skip_tokens() -> Vec<String> {
        vec!["ISAÍAS".into()]
    }
    pub fn counter_marker() -> String {
        "Joias espirituais".into()
    }
    pub fn duration_pattern() -> String {
        r"\((\d+)\s*min\)".into()
    }

    // Output defaults
    pub fn output_path() -> String {
        "agenda_2026.json".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.crawler.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.selectors.week_title = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_duration_pattern() {
        let mut config = Config::default();
        config.filters.duration_pattern = r"(\d+".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            request_delay_ms = 0

            [output]
            path = "out/agenda.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.request_delay_ms, 0);
        assert_eq!(config.crawler.max_attempts, 3);
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.output.path, "out/agenda.json");
        assert_eq!(config.selectors.week_title, "h1#p1");
    }

    #[test]
    fn load_reports_malformed_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[crawler\nmax_attempts = 3").unwrap();
        assert!(matches!(Config::load(&path), Err(AppError::Toml(_))));
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("/nonexistent/config.toml");
        assert_eq!(config.site.base_url, "https://wol.jw.org");
    }
}
