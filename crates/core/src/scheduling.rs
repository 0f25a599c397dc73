//! Pure scheduling rules: timetable and schedule validation, the next-cycle
//! date of a weekly schedule, session partitioning, and the cancellation cutoff.
//!
//! The stores call into these functions inside their transactions so that the
//! rules are evaluated against committed state, while the rules themselves stay
//! testable without a database.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::errors::{TimelineError, TimelineResult};
use crate::models::schedule::ScheduleDay;
use crate::models::time::{DayWindow, IsoWeekday, TimeOfDay};
use crate::models::timetable::{OpenHours, Timetable};

/// Longest session a worker can be configured with.
pub const MAX_SESSION_MINUTES: u32 = 24 * 60;

/// Date of the occurrence of `weekday` in the ISO week after the one containing `today`.
///
/// Generation always targets the next week, never the current one: running on a
/// Monday for a Monday schedule yields the Monday seven days later, and running
/// on a Sunday for a Monday schedule yields the next day.
pub fn next_cycle_date(today: NaiveDate, weekday: IsoWeekday) -> NaiveDate {
    let current = i64::from(IsoWeekday::of(today).number());
    let days = (7 - current) + i64::from(weekday.number());
    today + Duration::days(days)
}

/// A concrete session to be materialized as a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPlan {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannedDay {
    pub sessions: Vec<SessionPlan>,
    pub skipped_in_break: usize,
}

/// Splits the work block `[start, over)` on `date` into back-to-back sessions.
///
/// The number of sessions is `floor((over - start) / session_minutes)`; a
/// trailing remainder shorter than a session is dropped. A session whose start
/// falls inside `break_window` is skipped. Only the start is checked: a session
/// starting before the break may run into it.
pub fn plan_sessions(
    date: NaiveDate,
    start: TimeOfDay,
    over: TimeOfDay,
    session_minutes: u32,
    break_window: Option<DayWindow>,
) -> PlannedDay {
    let mut planned = PlannedDay::default();
    if session_minutes == 0 {
        return planned;
    }
    let Some(span) = start.minutes_until(over) else {
        return planned;
    };

    let day_start = date.and_time(start.to_naive_time()).and_utc();
    let periods = span / session_minutes;
    for i in 0..periods {
        let offset = i * session_minutes;
        let chunk_start = start.minutes_since_midnight() + offset;
        if let (Some(window), Some(begin_time)) = (break_window, TimeOfDay::from_minutes(chunk_start)) {
            if window.contains(begin_time) {
                planned.skipped_in_break += 1;
                continue;
            }
        }
        let begin = day_start + Duration::minutes(i64::from(offset));
        let end = begin + Duration::minutes(i64::from(session_minutes));
        planned.sessions.push(SessionPlan { begin, end });
    }
    planned
}

/// Checks one weekday of operating hours.
pub fn validate_open_hours(hours: &OpenHours) -> TimelineResult<()> {
    if hours.open >= hours.close {
        return Err(TimelineError::Validation(format!(
            "{}: opening time {} must be before closing time {}",
            hours.weekday, hours.open, hours.close
        )));
    }
    match (hours.break_start, hours.break_end) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) => {
            if start >= end {
                return Err(TimelineError::Validation(format!(
                    "{}: break start {start} must be before break end {end}",
                    hours.weekday
                )));
            }
            if start < hours.open || end > hours.close {
                return Err(TimelineError::Validation(format!(
                    "{}: break {start}-{end} must lie within opening hours {}-{}",
                    hours.weekday, hours.open, hours.close
                )));
            }
            Ok(())
        }
        _ => Err(TimelineError::Validation(format!(
            "{}: break start and break end must be set together",
            hours.weekday
        ))),
    }
}

/// Rejects timetable requests with invalid hours or repeated weekdays.
pub fn validate_timetable_request(entries: &[OpenHours]) -> TimelineResult<()> {
    if entries.is_empty() {
        return Err(TimelineError::Validation("timetable must not be empty".into()));
    }
    let mut seen = [false; 8];
    for hours in entries {
        validate_open_hours(hours)?;
        let slot = &mut seen[usize::from(hours.weekday.number())];
        if *slot {
            return Err(TimelineError::Validation(format!(
                "{} appears more than once",
                hours.weekday
            )));
        }
        *slot = true;
    }
    Ok(())
}

/// Checks that a schedule day has a non-empty range.
pub fn validate_schedule_day(day: &ScheduleDay) -> TimelineResult<()> {
    if day.start >= day.over {
        return Err(TimelineError::Validation(format!(
            "{}: schedule start {} must be before end {}",
            day.weekday, day.start, day.over
        )));
    }
    Ok(())
}

pub fn validate_session_duration(minutes: u32) -> TimelineResult<()> {
    if minutes == 0 || minutes > MAX_SESSION_MINUTES {
        return Err(TimelineError::Validation(format!(
            "session duration must be within 1..={MAX_SESSION_MINUTES} minutes, got {minutes}"
        )));
    }
    Ok(())
}

/// Checks that `[start, over]` fits the organization's day.
///
/// The block must lie within opening hours and must not partially overlap the
/// break: it ends before the break, starts after it, or spans it entirely.
pub fn check_schedule_fits(
    timetable: &Timetable,
    start: TimeOfDay,
    over: TimeOfDay,
) -> TimelineResult<()> {
    if start >= over {
        return Err(TimelineError::Validation(format!(
            "schedule start {start} must be before end {over}"
        )));
    }
    if start < timetable.open || over > timetable.close {
        return Err(TimelineError::Validation(format!(
            "{}: schedule {start}-{over} is outside opening hours {}-{}",
            timetable.weekday, timetable.open, timetable.close
        )));
    }
    if let Some(window) = timetable.break_window() {
        let before = over <= window.start;
        let after = start >= window.end;
        let spans = start <= window.start && over >= window.end;
        if !(before || after || spans) {
            return Err(TimelineError::Validation(format!(
                "{}: schedule {start}-{over} partially overlaps the break {}-{}",
                timetable.weekday, window.start, window.end
            )));
        }
    }
    Ok(())
}

/// How long before a session starts cancellation and deletion stop being allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffPolicy {
    buffer_minutes: u32,
}

impl CutoffPolicy {
    pub const DEFAULT_BUFFER_MINUTES: u32 = 120;

    pub fn new(buffer_minutes: u32) -> Self {
        Self { buffer_minutes }
    }

    pub fn buffer_minutes(&self) -> u32 {
        self.buffer_minutes
    }
}

impl Default for CutoffPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[rstest]
    #[case(monday(), 1, 7)]
    #[case(monday(), 3, 9)]
    #[case(monday(), 7, 13)]
    #[case(monday() + Duration::days(2), 1, 5)]
    #[case(monday() + Duration::days(6), 1, 1)]
    #[case(monday() + Duration::days(6), 7, 7)]
    fn next_cycle_lands_in_next_iso_week(
        #[case] today: NaiveDate,
        #[case] weekday: u8,
        #[case] expected_days: i64,
    ) {
        let weekday = IsoWeekday::new(weekday).unwrap();
        let target = next_cycle_date(today, weekday);
        assert_eq!(target, today + Duration::days(expected_days));
        assert_eq!(IsoWeekday::of(target), weekday);
    }

    #[test]
    fn session_starting_in_break_is_dropped() {
        let date = monday() + Duration::days(7);
        let window = DayWindow { start: t("10:00"), end: t("10:15") };
        let planned = plan_sessions(date, t("09:00"), t("11:00"), 60, Some(window));

        assert_eq!(planned.sessions.len(), 1);
        assert_eq!(planned.skipped_in_break, 1);
        assert_eq!(planned.sessions[0].begin, date.and_hms_opt(9, 0, 0).unwrap().and_utc());
        assert_eq!(planned.sessions[0].end, date.and_hms_opt(10, 0, 0).unwrap().and_utc());
    }

    #[test]
    fn session_running_into_break_is_kept() {
        let window = DayWindow { start: t("12:00"), end: t("13:00") };
        let planned = plan_sessions(monday(), t("11:30"), t("13:30"), 60, Some(window));

        // 11:30 starts before the break and is kept; 12:30 starts inside it.
        assert_eq!(planned.sessions.len(), 1);
        assert_eq!(planned.skipped_in_break, 1);
    }

    #[test]
    fn remainder_shorter_than_a_session_is_discarded() {
        let planned = plan_sessions(monday(), t("09:00"), t("10:50"), 30, None);
        assert_eq!(planned.sessions.len(), 3);
        let last = planned.sessions.last().unwrap();
        assert_eq!(last.end, monday().and_hms_opt(10, 30, 0).unwrap().and_utc());
    }

    #[test]
    fn sessions_have_exact_duration_and_do_not_overlap() {
        let window = DayWindow { start: t("13:00"), end: t("14:00") };
        let planned = plan_sessions(monday(), t("08:00"), t("18:00"), 45, Some(window));

        for session in &planned.sessions {
            assert_eq!(session.end - session.begin, Duration::minutes(45));
            assert!(!window.contains(TimeOfDay::from(session.begin.time())));
        }
        for pair in planned.sessions.windows(2) {
            assert!(pair[0].end <= pair[1].begin);
        }
    }

    #[test]
    fn zero_duration_or_empty_block_plans_nothing() {
        assert!(plan_sessions(monday(), t("09:00"), t("10:00"), 0, None).sessions.is_empty());
        assert!(plan_sessions(monday(), t("10:00"), t("10:00"), 15, None).sessions.is_empty());
        assert!(plan_sessions(monday(), t("09:00"), t("09:20"), 30, None).sessions.is_empty());
    }

    fn timetable(open: &str, close: &str, brk: Option<(&str, &str)>) -> Timetable {
        Timetable {
            org_id: uuid::Uuid::nil(),
            weekday: IsoWeekday::new(1).unwrap(),
            open: t(open),
            close: t(close),
            break_start: brk.map(|b| t(b.0)),
            break_end: brk.map(|b| t(b.1)),
        }
    }

    #[rstest]
    #[case("09:00", "12:00", true)]
    #[case("14:00", "18:00", true)]
    #[case("09:00", "18:00", true)]
    #[case("11:00", "13:30", true)]
    #[case("11:00", "12:30", false)]
    #[case("12:30", "15:00", false)]
    #[case("07:00", "11:00", false)]
    #[case("15:00", "19:00", false)]
    #[case("12:00", "10:00", false)]
    fn schedule_containment(#[case] start: &str, #[case] over: &str, #[case] accepted: bool) {
        let day = timetable("08:00", "18:00", Some(("12:00", "13:00")));
        let result = check_schedule_fits(&day, t(start), t(over));
        assert_eq!(result.is_ok(), accepted, "{start}-{over}: {result:?}");
        if let Err(err) = result {
            assert!(matches!(err, TimelineError::Validation(_)));
        }
    }

    #[test]
    fn schedule_without_break_only_needs_opening_hours() {
        let day = timetable("08:00", "18:00", None);
        assert!(check_schedule_fits(&day, t("08:00"), t("18:00")).is_ok());
        assert!(check_schedule_fits(&day, t("07:59"), t("12:00")).is_err());
    }

    fn hours(open: &str, close: &str, brk: Option<(&str, &str)>) -> OpenHours {
        timetable(open, close, brk).into()
    }

    #[test]
    fn open_hours_validation() {
        assert!(validate_open_hours(&hours("08:00", "18:00", Some(("12:00", "13:00")))).is_ok());
        assert!(validate_open_hours(&hours("08:00", "18:00", None)).is_ok());
        assert!(validate_open_hours(&hours("18:00", "08:00", None)).is_err());
        assert!(validate_open_hours(&hours("08:00", "18:00", Some(("13:00", "12:00")))).is_err());
        assert!(validate_open_hours(&hours("08:00", "18:00", Some(("07:00", "09:00")))).is_err());

        let mut half_break = hours("08:00", "18:00", None);
        half_break.break_start = Some(t("12:00"));
        assert!(validate_open_hours(&half_break).is_err());
    }

    #[test]
    fn timetable_request_rejects_duplicate_weekday() {
        let entry = hours("08:00", "18:00", None);
        assert!(validate_timetable_request(&[entry.clone()]).is_ok());
        assert!(validate_timetable_request(&[entry.clone(), entry]).is_err());
        assert!(validate_timetable_request(&[]).is_err());
    }

    #[test]
    fn cutoff_policy_defaults_to_two_hours() {
        assert_eq!(CutoffPolicy::default().buffer_minutes(), 120);
        assert_eq!(CutoffPolicy::new(0).buffer_minutes(), 0);
    }

    #[test]
    fn session_duration_bounds() {
        assert!(validate_session_duration(30).is_ok());
        assert!(validate_session_duration(0).is_err());
        assert!(validate_session_duration(MAX_SESSION_MINUTES + 1).is_err());
    }
}
