use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::{IsoWeekday, TimeOfDay};

/// A worker's recurring work block on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSchedule {
    pub worker_schedule_id: Uuid,
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub weekday: IsoWeekday,
    pub start: TimeOfDay,
    pub over: TimeOfDay,
    pub created_at: DateTime<Utc>,
}

/// One weekday of a schedule add/update request.
///
/// `worker_schedule_id` identifies the row to replace on update and is
/// ignored on add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    #[serde(default)]
    pub worker_schedule_id: Option<Uuid>,
    pub weekday: IsoWeekday,
    pub start: TimeOfDay,
    pub over: TimeOfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerScheduleRequest {
    pub worker_id: Uuid,
    pub org_id: Uuid,
    /// Minutes per bookable session. `0` keeps the worker's current value.
    #[serde(default)]
    pub session_duration: u32,
    pub schedule: Vec<ScheduleDay>,
}

/// Filter for schedule listings; `None` means "any".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleQuery {
    pub org_id: Uuid,
    #[serde(default)]
    pub worker_id: Option<Uuid>,
    #[serde(default)]
    pub weekday: Option<IsoWeekday>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerWeek {
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub session_duration: u32,
    pub schedule: Vec<WorkerSchedule>,
}

/// Active schedule row joined with everything slot generation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSource {
    pub worker_schedule_id: Uuid,
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub weekday: IsoWeekday,
    pub start: TimeOfDay,
    pub over: TimeOfDay,
    pub session_duration: u32,
    pub break_start: Option<TimeOfDay>,
    pub break_end: Option<TimeOfDay>,
    /// False when the organization has no timetable row for the weekday.
    pub has_timetable: bool,
}
