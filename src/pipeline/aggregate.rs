// src/pipeline/aggregate.rs

//! Deduplication and persistence of the crawled schedule.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::MeetingWeek;
use crate::storage::ScheduleStorage;

/// How a run ended, when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Schedule persisted
    Saved { count: usize, location: String },
    /// Nothing usable was extracted; nothing was written
    Empty,
}

/// Drop weeks whose title was already seen, keeping the first occurrence.
pub fn dedup_by_title(weeks: Vec<MeetingWeek>) -> Vec<MeetingWeek> {
    let mut seen = HashSet::new();
    weeks
        .into_iter()
        .filter(|week| seen.insert(week.title.clone()))
        .collect()
}

/// Deduplicate and persist. An empty schedule is never written.
pub async fn finalize(
    weeks: Vec<MeetingWeek>,
    storage: &dyn ScheduleStorage,
) -> Result<RunStatus> {
    let total = weeks.len();
    let weeks = dedup_by_title(weeks);

    if weeks.is_empty() {
        log::error!("No weeks were extracted; nothing to save");
        return Ok(RunStatus::Empty);
    }

    if weeks.len() < total {
        log::info!("Dropped {} duplicate week(s)", total - weeks.len());
    }

    let location = storage.write_schedule(&weeks).await?;
    Ok(RunStatus::Saved {
        count: weeks.len(),
        location,
    })
}
