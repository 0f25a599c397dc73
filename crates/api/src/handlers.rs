pub mod booking;
pub mod feedback;
pub mod schedule;
pub mod slot;
pub mod timetable;

use serde::Deserialize;
use timeline_core::models::time::IsoWeekday;
use uuid::Uuid;

/// `?weekday=N` on delete endpoints; absent means the whole week.
#[derive(Debug, Default, Deserialize)]
pub struct WeekdayParam {
    #[serde(default)]
    pub weekday: Option<IsoWeekday>,
}

/// Acting user for operations that carry no body.
#[derive(Debug, Deserialize)]
pub struct UserParam {
    pub user_id: Uuid,
}
