pub mod feedback;
pub mod notification;
pub mod record;
pub mod schedule;
pub mod slot;
pub mod time;
pub mod timetable;
