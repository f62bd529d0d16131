//! Storage abstractions for schedule persistence.
//!
//! The persisted artifact is a single JSON document: the ordered list of
//! `MeetingWeek` records.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::MeetingWeek;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for schedule storage backends.
#[async_trait]
pub trait ScheduleStorage: Send + Sync {
    /// Replace the stored schedule, returning where it was written.
    async fn write_schedule(&self, weeks: &[MeetingWeek]) -> Result<String>;

    /// Load the stored schedule, `None` when nothing has been written yet.
    async fn load_schedule(&self) -> Result<Option<Vec<MeetingWeek>>>;
}
