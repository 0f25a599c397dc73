use async_trait::async_trait;
use mockall::mock;
use timeline_core::{
    errors::TimelineResult,
    models::{
        feedback::{Feedback, FeedbackQuery, FeedbackRequest},
        notification::{CancellationPayload, ReminderPayload},
        record::{BookedRecord, BookingRequest, Record, RecordDetails, RecordList, RecordPatch, RecordQuery},
        schedule::{ScheduleQuery, WorkerSchedule, WorkerScheduleRequest, WorkerWeek},
        slot::{GenerationReport, Slot, SlotQuery},
        time::IsoWeekday,
        timetable::{OpenHours, Timetable},
    },
    scheduling::CutoffPolicy,
    store::{FeedbackStore, RecordStore, ScheduleStore, SlotStore, TimetableStore},
};
use uuid::Uuid;

// Mock stores for testing the engine and the API without Postgres
mock! {
    pub TimetableRepo {}

    #[async_trait]
    impl TimetableStore for TimetableRepo {
        async fn timetable(&self, org_id: Uuid) -> TimelineResult<Vec<Timetable>>;
        async fn add_timetable(&self, org_id: Uuid, hours: Vec<OpenHours>) -> TimelineResult<Vec<Timetable>>;
        async fn update_timetable(&self, org_id: Uuid, hours: Vec<OpenHours>) -> TimelineResult<Vec<Timetable>>;
        async fn delete_timetable(&self, org_id: Uuid, weekday: Option<IsoWeekday>) -> TimelineResult<u64>;
    }
}

mock! {
    pub ScheduleRepo {}

    #[async_trait]
    impl ScheduleStore for ScheduleRepo {
        async fn worker_schedules(&self, query: ScheduleQuery) -> TimelineResult<Vec<WorkerWeek>>;
        async fn add_worker_schedule(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>>;
        async fn update_worker_schedule(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>>;
        async fn soft_delete_worker_schedule(
            &self,
            org_id: Uuid,
            worker_id: Uuid,
            weekday: Option<IsoWeekday>,
        ) -> TimelineResult<u64>;
        async fn retire_worker(&self, org_id: Uuid, worker_id: Uuid) -> TimelineResult<()>;
    }
}

mock! {
    pub SlotRepo {}

    #[async_trait]
    impl SlotStore for SlotRepo {
        async fn generate_slots(&self) -> TimelineResult<GenerationReport>;
        async fn delete_expired_slots(&self) -> TimelineResult<u64>;
        async fn slots(&self, query: SlotQuery) -> TimelineResult<Vec<Slot>>;
    }
}

mock! {
    pub RecordRepo {}

    #[async_trait]
    impl RecordStore for RecordRepo {
        async fn book(&self, request: BookingRequest) -> TimelineResult<BookedRecord>;
        async fn cancel(&self, record_id: Uuid, reason: String, cutoff: CutoffPolicy) -> TimelineResult<CancellationPayload>;
        async fn record(&self, record_id: Uuid) -> TimelineResult<RecordDetails>;
        async fn records(&self, query: RecordQuery) -> TimelineResult<RecordList>;
        async fn patch_record(&self, record_id: Uuid, patch: RecordPatch) -> TimelineResult<Record>;
        async fn delete_record(&self, record_id: Uuid, cutoff: CutoffPolicy) -> TimelineResult<()>;
        async fn upcoming_reminders(&self, window_minutes: u32) -> TimelineResult<Vec<ReminderPayload>>;
    }
}

mock! {
    pub FeedbackRepo {}

    #[async_trait]
    impl FeedbackStore for FeedbackRepo {
        async fn set_feedback(&self, request: FeedbackRequest) -> TimelineResult<Feedback>;
        async fn update_feedback(&self, request: FeedbackRequest) -> TimelineResult<Feedback>;
        async fn delete_feedback(&self, record_id: Uuid, user_id: Uuid) -> TimelineResult<()>;
        async fn feedbacks(&self, query: FeedbackQuery) -> TimelineResult<Vec<Feedback>>;
    }
}
