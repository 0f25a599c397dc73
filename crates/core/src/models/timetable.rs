use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::{DayWindow, IsoWeekday, TimeOfDay};

/// Operating hours of one organization on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub org_id: Uuid,
    pub weekday: IsoWeekday,
    pub open: TimeOfDay,
    pub close: TimeOfDay,
    pub break_start: Option<TimeOfDay>,
    pub break_end: Option<TimeOfDay>,
}

impl Timetable {
    pub fn break_window(&self) -> Option<DayWindow> {
        match (self.break_start, self.break_end) {
            (Some(start), Some(end)) => Some(DayWindow { start, end }),
            _ => None,
        }
    }
}

/// One weekday entry of a timetable add/update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHours {
    pub weekday: IsoWeekday,
    pub open: TimeOfDay,
    pub close: TimeOfDay,
    #[serde(default)]
    pub break_start: Option<TimeOfDay>,
    #[serde(default)]
    pub break_end: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableRequest {
    pub org_id: Uuid,
    pub timetable: Vec<OpenHours>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableResponse {
    pub org_id: Uuid,
    pub timetable: Vec<OpenHours>,
}

impl From<Timetable> for OpenHours {
    fn from(value: Timetable) -> Self {
        Self {
            weekday: value.weekday,
            open: value.open,
            close: value.close,
            break_start: value.break_start,
            break_end: value.break_end,
        }
    }
}
