// src/services/weeks.rs

//! Week page parser.
//!
//! Turns a week page into a `MeetingWeek` by walking its headings in
//! document order: each `h2` opens a section, each `h3` adds a part to the
//! open section. The textual heuristics (special weeks, caption headings,
//! counter parts, duration pattern) are injected through `WeekRules`.

use std::num::IntErrorKind;
use std::sync::Arc;

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{FilterConfig, MeetingWeek, Part, Section};
use crate::utils::element_text;

/// Predicate over normalized heading text.
pub type TextPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Case-insensitive "contains any token" predicate.
pub fn contains_any(tokens: &[String]) -> TextPredicate {
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_uppercase()).collect();
    Arc::new(move |text: &str| {
        let upper = text.to_uppercase();
        tokens.iter().any(|t| upper.contains(t.as_str()))
    })
}

/// Case-sensitive literal phrase predicate.
pub fn contains_phrase(phrase: &str) -> TextPredicate {
    let phrase = phrase.to_string();
    Arc::new(move |text: &str| text.contains(&phrase))
}

/// Heuristics tied to the site's current markup.
#[derive(Clone)]
pub struct WeekRules {
    /// Week titles that are commemorations rather than regular meetings
    pub is_special_week: TextPredicate,

    /// `h2` headings that are captions, not section boundaries
    pub is_caption: TextPredicate,

    /// `h3` headings whose part shows a running counter
    pub has_counter: TextPredicate,

    /// Duration pattern; capture group 1 holds the minutes
    pub duration: Regex,
}

impl WeekRules {
    pub fn from_config(filters: &FilterConfig) -> Result<Self> {
        let duration = Regex::new(&filters.duration_pattern).map_err(|e| {
            AppError::config(format!(
                "Invalid duration pattern '{}': {e}",
                filters.duration_pattern
            ))
        })?;

        Ok(Self {
            is_special_week: contains_any(&filters.special_week_tokens),
            is_caption: contains_any(&filters.section_skip_tokens),
            has_counter: contains_phrase(&filters.counter_marker),
            duration,
        })
    }

    /// Minutes stated in `text`, 0 when the pattern does not match.
    ///
    /// Values too large for `u64` saturate.
    pub fn minutes_in(&self, text: &str) -> u64 {
        let Some(digits) = self.duration.captures(text).and_then(|caps| caps.get(1)) else {
            return 0;
        };
        match digits.as_str().parse::<u64>() {
            Ok(minutes) => minutes,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => u64::MAX,
            Err(_) => 0,
        }
    }
}

/// Why a page produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The primary heading is missing
    NotAWeekPage,
    /// Commemorative week, excluded from the schedule
    SpecialWeek(String),
}

/// Result of parsing one week page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekOutcome {
    Week(MeetingWeek),
    Skip(SkipReason),
}

/// Structural element of a week page, in document order.
#[derive(Debug)]
enum Block {
    Heading2(String),
    Heading3(String),
    Paragraph(String),
}

/// Parser for week pages.
pub struct WeekParser {
    title_selector: Selector,
    block_selector: Selector,
    rules: WeekRules,
}

impl WeekParser {
    pub fn new(title_selector: &str, rules: WeekRules) -> Result<Self> {
        Ok(Self {
            title_selector: Self::parse_selector(title_selector)?,
            block_selector: Self::parse_selector("h2, h3, p")?,
            rules,
        })
    }

    /// Parse a raw week page.
    pub fn parse(&self, html: &str) -> WeekOutcome {
        let document = Html::parse_document(html);
        self.parse_document(&document)
    }

    /// Parse an already parsed week page.
    pub fn parse_document(&self, document: &Html) -> WeekOutcome {
        let Some(heading) = document.select(&self.title_selector).next() else {
            return WeekOutcome::Skip(SkipReason::NotAWeekPage);
        };

        let title = element_text(&heading);
        if (self.rules.is_special_week)(title.as_str()) {
            return WeekOutcome::Skip(SkipReason::SpecialWeek(title));
        }

        let blocks: Vec<Block> = document
            .select(&self.block_selector)
            .filter_map(|el| match el.value().name() {
                "h2" => Some(Block::Heading2(element_text(&el))),
                "h3" => Some(Block::Heading3(element_text(&el))),
                "p" => Some(Block::Paragraph(el.text().collect())),
                _ => None,
            })
            .collect();

        WeekOutcome::Week(MeetingWeek {
            title,
            sections: self.fold_sections(&blocks),
        })
    }

    /// Fold the block sequence into sections, carrying the open one.
    fn fold_sections(&self, blocks: &[Block]) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut open: Option<Section> = None;

        for (idx, block) in blocks.iter().enumerate() {
            match block {
                Block::Heading2(text) => {
                    if (self.rules.is_caption)(text.as_str()) {
                        continue;
                    }
                    if let Some(done) = open.replace(Section::new(text.as_str())) {
                        sections.push(done);
                    }
                }
                Block::Heading3(text) => {
                    // Parts before the first section are dropped.
                    let Some(section) = open.as_mut() else {
                        continue;
                    };
                    let next_paragraph = blocks[idx + 1..]
                        .iter()
                        .find_map(|b| match b {
                            Block::Paragraph(p) => Some(p.as_str()),
                            _ => None,
                        })
                        .unwrap_or("");
                    section.parts.push(self.build_part(text, next_paragraph));
                }
                Block::Paragraph(_) => {}
            }
        }

        sections.extend(open);
        sections
    }

    fn build_part(&self, heading: &str, next_paragraph: &str) -> Part {
        let title = heading.split('(').next().unwrap_or("").trim().to_string();
        let duration_minutes = self
            .rules
            .minutes_in(&format!("{heading} {next_paragraph}"));

        Part {
            title,
            duration_minutes,
            has_counter: (self.rules.has_counter)(heading),
        }
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
