//! Calendar primitives used by timetables, schedules and slots.
//!
//! Operating hours and work blocks repeat every week, so they are modelled as
//! a [`TimeOfDay`] on an [`IsoWeekday`] rather than as full timestamps. Only
//! slots carry a concrete date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::{TimelineError, TimelineResult};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time with minute precision, independent of any date.
///
/// Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> TimelineResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(TimelineError::Validation(format!(
                "{hour:02}:{minute:02} is not a valid time of day"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    /// Builds a time from minutes past midnight. `None` past 23:59.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        if minutes >= MINUTES_PER_DAY {
            return None;
        }
        Some(Self {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        })
    }

    /// Whole minutes from `self` until `later`; `None` when `later` is not after `self`.
    pub fn minutes_until(&self, later: TimeOfDay) -> Option<u32> {
        later
            .minutes_since_midnight()
            .checked_sub(self.minutes_since_midnight())
            .filter(|m| *m > 0)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or_default()
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Seconds are truncated.
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(time: TimeOfDay) -> Self {
        time.to_naive_time()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimelineError::Validation(format!("'{s}' is not a HH:MM time"));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.parse::<u8>().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// ISO-8601 weekday number: 1 = Monday ... 7 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct IsoWeekday(u8);

impl IsoWeekday {
    pub fn new(number: u8) -> TimelineResult<Self> {
        if !(1..=7).contains(&number) {
            return Err(TimelineError::Validation(format!(
                "weekday must be within 1..=7, got {number}"
            )));
        }
        Ok(Self(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday().number_from_monday() as u8)
    }

    pub fn all() -> impl Iterator<Item = IsoWeekday> {
        (1..=7).map(IsoWeekday)
    }
}

impl TryFrom<i16> for IsoWeekday {
    type Error = TimelineError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        let number = u8::try_from(value).map_err(|_| {
            TimelineError::Validation(format!("weekday must be within 1..=7, got {value}"))
        })?;
        IsoWeekday::new(number)
    }
}

impl From<IsoWeekday> for i16 {
    fn from(value: IsoWeekday) -> Self {
        i16::from(value.0)
    }
}

impl fmt::Display for IsoWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Sunday",
        };
        f.write_str(name)
    }
}

/// Half-open `[start, end)` window of the day, e.g. an organization break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DayWindow {
    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start <= time && time < self.end
    }
}
