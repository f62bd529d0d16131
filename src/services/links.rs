// src/services/links.rs

//! Directory link extraction for year and month index pages.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::{normalize_whitespace, resolve_url};

/// An anchor found in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute
    pub href: String,

    /// Visible text, whitespace collapsed
    pub text: String,
}

/// Accepts anchors whose href contains the year's publication path.
pub fn month_filter(path_segment: &str) -> impl Fn(&Anchor) -> bool + '_ {
    move |anchor: &Anchor| anchor.href.contains(path_segment)
}

/// Accepts anchors whose text has a digit and is not the month's cover entry.
pub fn week_filter(cover_label: &str) -> impl Fn(&Anchor) -> bool + '_ {
    move |anchor: &Anchor| {
        anchor.text.chars().any(|c| c.is_ascii_digit()) && !anchor.text.contains(cover_label)
    }
}

/// Extracts child page links from a directory listing.
pub struct LinkExtractor {
    base_url: Url,
    link_selector: Selector,
}

impl LinkExtractor {
    /// Create an extractor resolving hrefs against `base_url`.
    pub fn new(base_url: &str, link_selector: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            link_selector: Self::parse_selector(link_selector)?,
        })
    }

    /// Absolute URLs of the accepted anchors, first occurrence order, no duplicates.
    ///
    /// An empty result is a valid outcome.
    pub fn extract<F>(&self, html: &str, filter: F) -> Vec<String>
    where
        F: Fn(&Anchor) -> bool,
    {
        let document = Html::parse_document(html);
        self.extract_from(&document, filter)
    }

    /// Same as `extract`, over an already parsed document.
    pub fn extract_from<F>(&self, document: &Html, filter: F) -> Vec<String>
    where
        F: Fn(&Anchor) -> bool,
    {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.link_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let anchor = Anchor {
                href: href.to_string(),
                text: normalize_whitespace(&element.text().collect::<String>()),
            };
            if !filter(&anchor) {
                continue;
            }

            let link = resolve_url(&self.base_url, &anchor.href);
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }

        links
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
