pub mod booking;
pub mod feedback;
pub mod health;
pub mod schedule;
pub mod slot;
pub mod timetable;
