//! Service layer for the crawler application.
//!
//! - Directory link extraction (`LinkExtractor`)
//! - Week page parsing (`WeekParser`)

mod links;
mod weeks;

pub use links::{Anchor, LinkExtractor, month_filter, week_filter};
pub use weeks::{
    SkipReason, TextPredicate, WeekOutcome, WeekParser, WeekRules, contains_any, contains_phrase,
};
