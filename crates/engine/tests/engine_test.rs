use std::sync::Arc;

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use timeline_core::{
    errors::TimelineError,
    models::{
        feedback::FeedbackRequest,
        notification::{CancellationPayload, Notification, ReminderPayload},
        record::{BookedRecord, BookingRequest, CancelRequest, Record, RecordPatch, RecordQuery},
        schedule::{ScheduleDay, WorkerScheduleRequest},
        slot::GenerationReport,
        time::IsoWeekday,
        timetable::{OpenHours, TimetableRequest},
    },
    scheduling::CutoffPolicy,
};
use timeline_db::mock::repositories::{MockFeedbackRepo, MockRecordRepo, MockScheduleRepo, MockSlotRepo, MockTimetableRepo};
use timeline_engine::{
    CancellationHandler, ChannelNotifier, ExpiryReaper, FeedbackGate, Notifier, ScheduleManager, SlotAllocator,
    SlotGenerator, TimetableManager, TracingNotifier, jobs::DailyJob, EngineConfig,
};
use uuid::Uuid;

fn reminder() -> ReminderPayload {
    let begin = Utc::now() + Duration::days(1);
    ReminderPayload {
        user_email: "user@example.com".to_string(),
        service_name: "Haircut".to_string(),
        service_description: "Classic cut".to_string(),
        org_name: "Barbers".to_string(),
        org_address: "Main st. 1".to_string(),
        session_date: begin.date_naive(),
        session_begin: begin,
        session_end: begin + Duration::hours(1),
    }
}

fn booking() -> BookingRequest {
    BookingRequest {
        org_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        worker_id: Uuid::new_v4(),
        service_id: Uuid::new_v4(),
        slot_id: Uuid::new_v4(),
    }
}

fn record_for(request: &BookingRequest) -> Record {
    Record {
        record_id: Uuid::new_v4(),
        org_id: request.org_id,
        user_id: request.user_id,
        worker_id: request.worker_id,
        service_id: request.service_id,
        slot_id: request.slot_id,
        reviewed: false,
        is_canceled: false,
        cancel_reason: None,
        created_at: Utc::now(),
    }
}

fn tracing_notifier() -> Arc<dyn Notifier> {
    Arc::new(TracingNotifier)
}

fn time(value: &str) -> timeline_core::models::time::TimeOfDay {
    value.parse().unwrap()
}

fn schedule_request(days: &[(u8, Option<Uuid>)], session_duration: u32) -> WorkerScheduleRequest {
    WorkerScheduleRequest {
        worker_id: Uuid::new_v4(),
        org_id: Uuid::new_v4(),
        session_duration,
        schedule: days
            .iter()
            .map(|(weekday, id)| ScheduleDay {
                worker_schedule_id: *id,
                weekday: IsoWeekday::new(*weekday).unwrap(),
                start: time("09:00"),
                over: time("17:00"),
            })
            .collect(),
    }
}

#[test_log::test(tokio::test)]
async fn test_booking_dispatches_reminder_after_commit() {
    let request = booking();
    let record = record_for(&request);
    let booked = BookedRecord {
        record: record.clone(),
        reminder: reminder(),
    };

    let mut store = MockRecordRepo::new();
    let expected_slot = request.slot_id;
    store
        .expect_book()
        .withf(move |req| req.slot_id == expected_slot)
        .times(1)
        .returning(move |_| Ok(booked.clone()));

    let (notifier, mut receiver) = ChannelNotifier::new(4);
    let allocator = SlotAllocator::new(Arc::new(store), Arc::new(notifier));

    let result = allocator.book(request).await.unwrap();
    assert_eq!(result, record);

    let Notification::Reminder(sent) = receiver.try_recv().unwrap() else {
        panic!("expected a reminder");
    };
    assert_eq!(sent.user_email, "user@example.com");
}

#[test_log::test(tokio::test)]
async fn test_losing_booking_sends_nothing() {
    let mut store = MockRecordRepo::new();
    store
        .expect_book()
        .returning(|req| Err(TimelineError::Conflict(format!("slot {} is already taken", req.slot_id))));

    let (notifier, mut receiver) = ChannelNotifier::new(4);
    let allocator = SlotAllocator::new(Arc::new(store), Arc::new(notifier));

    let result = allocator.book(booking()).await;
    assert!(matches!(result, Err(TimelineError::Conflict(_))));
    assert!(receiver.try_recv().is_err());
}

#[test_log::test(tokio::test)]
async fn test_cancel_uses_configured_cutoff_and_notifies() {
    let record_id = Uuid::new_v4();
    let mut store = MockRecordRepo::new();
    store
        .expect_cancel()
        .withf(move |id, reason, cutoff| *id == record_id && reason == "Sick" && cutoff.buffer_minutes() == 30)
        .times(1)
        .returning(|_, reason, _| {
            Ok(CancellationPayload {
                session: reminder(),
                cancel_reason: reason,
            })
        });

    let (notifier, mut receiver) = ChannelNotifier::new(4);
    let handler = CancellationHandler::new(Arc::new(store), Arc::new(notifier), CutoffPolicy::new(30));

    let payload = handler
        .cancel(CancelRequest {
            record_id,
            reason: "Sick".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(payload.cancel_reason, "Sick");

    match receiver.try_recv().unwrap() {
        Notification::Cancellation(sent) => assert_eq!(sent, payload),
        other => panic!("unexpected notification: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_cancel_past_cutoff_is_conflict() {
    let mut store = MockRecordRepo::new();
    store
        .expect_cancel()
        .returning(|id, _, _| Err(TimelineError::Conflict(format!("record {id} is past the cancellation cutoff"))));

    let (notifier, mut receiver) = ChannelNotifier::new(4);
    let handler = CancellationHandler::new(Arc::new(store), Arc::new(notifier), CutoffPolicy::default());

    let result = handler
        .cancel(CancelRequest {
            record_id: Uuid::new_v4(),
            reason: "Late".to_string(),
        })
        .await;
    assert!(matches!(result, Err(TimelineError::Conflict(_))));
    assert!(receiver.try_recv().is_err());
}

#[test_log::test(tokio::test)]
async fn test_delete_record_shares_cutoff() {
    let mut store = MockRecordRepo::new();
    store
        .expect_delete_record()
        .withf(|_, cutoff| *cutoff == CutoffPolicy::default())
        .times(1)
        .returning(|_, _| Ok(()));

    let handler = CancellationHandler::new(Arc::new(store), tracing_notifier(), CutoffPolicy::default());
    handler.delete(Uuid::new_v4()).await.unwrap();
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(-1)]
#[tokio::test]
async fn test_feedback_rejects_out_of_range_stars(#[case] stars: i16) {
    let mut store = MockFeedbackRepo::new();
    store.expect_set_feedback().times(0);
    store.expect_update_feedback().times(0);
    let gate = FeedbackGate::new(Arc::new(store));

    let request = FeedbackRequest {
        record_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        stars,
        text: String::new(),
    };
    assert!(matches!(gate.set(request.clone()).await, Err(TimelineError::Validation(_))));
    assert!(matches!(gate.update(request).await, Err(TimelineError::Validation(_))));
}

#[test_log::test(tokio::test)]
async fn test_feedback_before_session_end_is_surfaced() {
    let mut store = MockFeedbackRepo::new();
    store
        .expect_set_feedback()
        .times(1)
        .returning(|req| Err(TimelineError::Conflict(format!("session of record {} has not finished yet", req.record_id))));
    let gate = FeedbackGate::new(Arc::new(store));

    let result = gate
        .set(FeedbackRequest {
            record_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            stars: 5,
            text: "Nice".to_string(),
        })
        .await;
    assert!(matches!(result, Err(TimelineError::Conflict(_))));
}

#[rstest]
#[case::empty(schedule_request(&[], 60))]
#[case::repeated_weekday(schedule_request(&[(1, None), (1, None)], 60))]
#[case::session_too_long(schedule_request(&[(1, None)], 24 * 60 + 1))]
#[tokio::test]
async fn test_schedule_add_validation(#[case] request: WorkerScheduleRequest) {
    let mut store = MockScheduleRepo::new();
    store.expect_add_worker_schedule().times(0);
    let manager = ScheduleManager::new(Arc::new(store));

    assert!(matches!(manager.add(request).await, Err(TimelineError::Validation(_))));
}

#[test_log::test(tokio::test)]
async fn test_schedule_update_requires_ids() {
    let mut store = MockScheduleRepo::new();
    store.expect_update_worker_schedule().times(0);
    let manager = ScheduleManager::new(Arc::new(store));

    let request = schedule_request(&[(1, Some(Uuid::new_v4())), (2, None)], 0);
    assert!(matches!(manager.update(request).await, Err(TimelineError::Validation(_))));
}

#[test_log::test(tokio::test)]
async fn test_schedule_add_passes_valid_request() {
    let mut store = MockScheduleRepo::new();
    store
        .expect_add_worker_schedule()
        .withf(|req| req.schedule.len() == 2 && req.session_duration == 45)
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let manager = ScheduleManager::new(Arc::new(store));

    let request = schedule_request(&[(1, None), (3, None)], 45);
    assert!(manager.add(request).await.is_ok());
}

#[test_log::test(tokio::test)]
async fn test_timetable_validation_happens_before_store() {
    let mut store = MockTimetableRepo::new();
    store.expect_add_timetable().times(0);
    let manager = TimetableManager::new(Arc::new(store));

    let request = TimetableRequest {
        org_id: Uuid::new_v4(),
        timetable: vec![OpenHours {
            weekday: IsoWeekday::new(1).unwrap(),
            open: time("18:00"),
            close: time("08:00"),
            break_start: None,
            break_end: None,
        }],
    };
    assert!(matches!(manager.add(request).await, Err(TimelineError::Validation(_))));
}

#[test_log::test(tokio::test)]
async fn test_generation_invariant_violation_is_returned() {
    let mut store = MockSlotRepo::new();
    store
        .expect_generate_slots()
        .times(1)
        .returning(|| Err(TimelineError::InvariantViolation("schedule without timetable".into())));
    let generator = SlotGenerator::new(Arc::new(store));

    assert!(matches!(generator.run().await, Err(TimelineError::InvariantViolation(_))));
}

#[test_log::test(tokio::test)]
async fn test_daily_job_generates_even_when_sweep_fails() {
    let mut slots = MockSlotRepo::new();
    slots
        .expect_delete_expired_slots()
        .times(1)
        .returning(|| Err(TimelineError::Database(eyre::eyre!("connection reset"))));
    let report = GenerationReport {
        target_schedules: 2,
        created: 7,
        ..GenerationReport::default()
    };
    slots.expect_generate_slots().times(1).returning(move || Ok(report));
    let slots = Arc::new(slots);

    let records = MockRecordRepo::new();
    let job = DailyJob::new(
        ExpiryReaper::new(slots.clone()),
        SlotGenerator::new(slots),
        SlotAllocator::new(Arc::new(records), tracing_notifier()),
        EngineConfig::default(),
    );

    let summary = job.run_daily().await;
    assert_eq!(summary.expired, None);
    assert_eq!(summary.generation, Some(report));
}

#[test_log::test(tokio::test)]
async fn test_reminders_use_configured_window() {
    let mut records = MockRecordRepo::new();
    records
        .expect_upcoming_reminders()
        .withf(|window| *window == 45)
        .times(1)
        .returning(|_| Ok(vec![reminder(), reminder()]));

    let (notifier, mut receiver) = ChannelNotifier::new(8);
    let job = DailyJob::new(
        ExpiryReaper::new(Arc::new(MockSlotRepo::new())),
        SlotGenerator::new(Arc::new(MockSlotRepo::new())),
        SlotAllocator::new(Arc::new(records), Arc::new(notifier)),
        EngineConfig {
            reminder_window_minutes: 45,
            ..EngineConfig::default()
        },
    );

    assert_eq!(job.run_reminders().await, Some(2));
    assert!(receiver.try_recv().is_ok());
    assert!(receiver.try_recv().is_ok());
    assert!(receiver.try_recv().is_err());
}

#[test_log::test(tokio::test)]
async fn test_record_queries_are_bounded() {
    let mut store = MockRecordRepo::new();
    store.expect_records().times(0);
    store.expect_patch_record().times(0);
    let allocator = SlotAllocator::new(Arc::new(store), tracing_notifier());

    let oversized = RecordQuery {
        limit: 1000,
        ..RecordQuery::default()
    };
    assert!(matches!(allocator.records(oversized).await, Err(TimelineError::Validation(_))));

    let empty_patch = allocator.patch(Uuid::new_v4(), RecordPatch::default()).await;
    assert!(matches!(empty_patch, Err(TimelineError::Validation(_))));
}

#[test]
fn test_channel_notifier_survives_closed_dispatcher() {
    let (notifier, receiver) = ChannelNotifier::new(1);
    drop(receiver);
    notifier.dispatch(Notification::Reminder(reminder()));
}
