use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub slot_id: Uuid,
    pub worker_schedule_id: Uuid,
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub date: NaiveDate,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub busy: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotQuery {
    #[serde(default)]
    pub worker_id: Option<Uuid>,
    #[serde(default)]
    pub org_id: Option<Uuid>,
}

/// Outcome of one slot generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub target_schedules: usize,
    pub created: usize,
    /// Sessions that were already generated by an earlier run.
    pub duplicates: usize,
    /// Sessions dropped because they start inside the organization break.
    pub skipped_in_break: usize,
    /// Schedules skipped because the worker has no session duration set.
    pub skipped_schedules: usize,
}
