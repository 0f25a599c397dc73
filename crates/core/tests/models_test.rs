use chrono::{NaiveDate, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, json, to_string};
use serde_test::{Token, assert_de_tokens_error, assert_tokens};
use timeline_core::models::{
    notification::{CancellationPayload, Notification, ReminderPayload},
    record::{RecordPatch, RecordQuery},
    schedule::WorkerScheduleRequest,
    time::{DayWindow, IsoWeekday, TimeOfDay},
    timetable::{OpenHours, TimetableRequest},
};
use uuid::Uuid;

#[test]
fn test_time_of_day_tokens() {
    let time = TimeOfDay::new(9, 5).unwrap();
    assert_tokens(&time, &[Token::Str("09:05")]);
}

#[test]
fn test_time_of_day_rejects_garbage() {
    assert_de_tokens_error::<TimeOfDay>(
        &[Token::Str("25:00")],
        "Validation error: 25:00 is not a valid time of day",
    );
}

#[rstest]
#[case("00:00", 0, 0)]
#[case("9:30", 9, 30)]
#[case("23:59", 23, 59)]
#[case(" 12:15 ", 12, 15)]
fn test_time_of_day_parse(#[case] input: &str, #[case] hour: u8, #[case] minute: u8) {
    let time: TimeOfDay = input.parse().unwrap();
    assert_eq!(time.hour(), hour);
    assert_eq!(time.minute(), minute);
}

#[rstest]
#[case("24:00")]
#[case("12:60")]
#[case("1200")]
#[case("12:5")]
#[case("")]
#[case("ab:cd")]
fn test_time_of_day_parse_errors(#[case] input: &str) {
    assert!(input.parse::<TimeOfDay>().is_err());
}

#[test]
fn test_time_of_day_ordering_and_arithmetic() {
    let nine = TimeOfDay::new(9, 0).unwrap();
    let half_ten = TimeOfDay::new(10, 30).unwrap();

    assert!(nine < half_ten);
    assert_eq!(nine.minutes_until(half_ten), Some(90));
    assert_eq!(half_ten.minutes_until(nine), None);
    assert_eq!(nine.minutes_until(nine), None);
    assert_eq!(TimeOfDay::from_minutes(630), Some(half_ten));
    assert_eq!(TimeOfDay::from_minutes(24 * 60), None);
}

#[test]
fn test_time_of_day_naive_time_round_trip_drops_seconds() {
    let naive = NaiveTime::from_hms_opt(14, 45, 59).unwrap();
    let time = TimeOfDay::from(naive);
    assert_eq!(time.to_string(), "14:45");
    assert_eq!(NaiveTime::from(time), NaiveTime::from_hms_opt(14, 45, 0).unwrap());
}

#[test]
fn test_day_window_is_half_open() {
    let window = DayWindow {
        start: TimeOfDay::new(10, 0).unwrap(),
        end: TimeOfDay::new(10, 15).unwrap(),
    };
    assert!(window.contains(TimeOfDay::new(10, 0).unwrap()));
    assert!(window.contains(TimeOfDay::new(10, 14).unwrap()));
    assert!(!window.contains(TimeOfDay::new(10, 15).unwrap()));
    assert!(!window.contains(TimeOfDay::new(9, 59).unwrap()));
}

#[test]
fn test_iso_weekday() {
    assert_tokens(&IsoWeekday::new(3).unwrap(), &[Token::I16(3)]);
    assert!(IsoWeekday::new(0).is_err());
    assert!(IsoWeekday::new(8).is_err());
    assert!(IsoWeekday::try_from(-1i16).is_err());

    let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
    assert_eq!(IsoWeekday::of(sunday).number(), 7);
    assert_eq!(IsoWeekday::of(sunday).to_string(), "Sunday");
    assert_eq!(IsoWeekday::all().count(), 7);
}

#[test]
fn test_timetable_request_deserialization() {
    let org_id = Uuid::new_v4();
    let body = json!({
        "org_id": org_id,
        "timetable": [
            { "weekday": 1, "open": "08:00", "close": "18:00", "break_start": "12:00", "break_end": "13:00" },
            { "weekday": 6, "open": "10:00", "close": "14:00" }
        ]
    });

    let request: TimetableRequest = serde_json::from_value(body).unwrap();
    assert_eq!(request.org_id, org_id);
    assert_eq!(request.timetable.len(), 2);
    assert_eq!(
        request.timetable[0],
        OpenHours {
            weekday: IsoWeekday::new(1).unwrap(),
            open: "08:00".parse().unwrap(),
            close: "18:00".parse().unwrap(),
            break_start: Some("12:00".parse().unwrap()),
            break_end: Some("13:00".parse().unwrap()),
        }
    );
    assert_eq!(request.timetable[1].break_start, None);
}

#[test]
fn test_schedule_request_defaults() {
    let body = json!({
        "worker_id": Uuid::new_v4(),
        "org_id": Uuid::new_v4(),
        "schedule": [{ "weekday": 2, "start": "09:00", "over": "17:00" }]
    });

    let request: WorkerScheduleRequest = serde_json::from_value(body).unwrap();
    assert_eq!(request.session_duration, 0);
    assert_eq!(request.schedule[0].worker_schedule_id, None);
}

#[test]
fn test_schedule_request_rejects_bad_weekday() {
    let body = json!({
        "worker_id": Uuid::new_v4(),
        "org_id": Uuid::new_v4(),
        "schedule": [{ "weekday": 9, "start": "09:00", "over": "17:00" }]
    });

    assert!(serde_json::from_value::<WorkerScheduleRequest>(body).is_err());
}

#[test]
fn test_record_query_defaults() {
    let query: RecordQuery = from_str("{}").unwrap();
    assert_eq!(query.limit, 20);
    assert_eq!(query.offset, 0);
    assert!(!query.fresh);
    assert!(RecordPatch::default().is_empty());
}

fn reminder() -> ReminderPayload {
    let begin = Utc::now();
    ReminderPayload {
        user_email: "user@example.com".to_string(),
        service_name: "Haircut".to_string(),
        service_description: "Classic cut".to_string(),
        org_name: "Barbers".to_string(),
        org_address: "Main st. 1".to_string(),
        session_date: begin.date_naive(),
        session_begin: begin,
        session_end: begin + chrono::Duration::hours(1),
    }
}

#[test]
fn test_notification_serialization() {
    let cancellation = Notification::Cancellation(CancellationPayload {
        session: reminder(),
        cancel_reason: "Sick".to_string(),
    });

    let json = to_string(&cancellation).expect("Failed to serialize notification");
    let value: serde_json::Value = from_str(&json).unwrap();
    assert_eq!(value["type"], "cancellation");
    assert_eq!(value["cancel_reason"], "Sick");
    assert_eq!(value["user_email"], "user@example.com");

    let deserialized: Notification = from_str(&json).expect("Failed to deserialize notification");
    assert_eq!(deserialized, cancellation);
    assert_eq!(deserialized.recipient(), "user@example.com");
}
