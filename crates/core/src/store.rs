//! Persistence seams of the booking core.
//!
//! Every method is one unit of work: implementations open a single
//! transaction, apply all of the operation's reads and writes against it, and
//! commit once. A method that returns an error has committed nothing.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::TimelineResult;
use crate::models::feedback::{Feedback, FeedbackQuery, FeedbackRequest};
use crate::models::notification::{CancellationPayload, ReminderPayload};
use crate::models::record::{BookedRecord, BookingRequest, Record, RecordDetails, RecordList, RecordPatch, RecordQuery};
use crate::models::schedule::{ScheduleQuery, WorkerSchedule, WorkerScheduleRequest, WorkerWeek};
use crate::models::slot::{GenerationReport, Slot, SlotQuery};
use crate::models::time::IsoWeekday;
use crate::models::timetable::{OpenHours, Timetable};
use crate::scheduling::CutoffPolicy;

#[async_trait]
pub trait TimetableStore: Send + Sync {
    async fn timetable(&self, org_id: Uuid) -> TimelineResult<Vec<Timetable>>;

    /// Fails with `Conflict` when a weekday already has hours.
    async fn add_timetable(&self, org_id: Uuid, hours: Vec<OpenHours>) -> TimelineResult<Vec<Timetable>>;

    /// Fails with `NotFound` when a weekday has no hours yet.
    async fn update_timetable(&self, org_id: Uuid, hours: Vec<OpenHours>) -> TimelineResult<Vec<Timetable>>;

    /// Deletes one weekday, or all when `weekday` is `None`, and soft-deletes
    /// the dependent worker schedules. Returns the number of weekdays removed.
    async fn delete_timetable(&self, org_id: Uuid, weekday: Option<IsoWeekday>) -> TimelineResult<u64>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn worker_schedules(&self, query: ScheduleQuery) -> TimelineResult<Vec<WorkerWeek>>;

    /// Inserts new weekdays; each must fit the organization's timetable.
    async fn add_worker_schedule(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>>;

    /// Replaces existing rows identified by `worker_schedule_id`.
    async fn update_worker_schedule(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>>;

    async fn soft_delete_worker_schedule(
        &self,
        org_id: Uuid,
        worker_id: Uuid,
        weekday: Option<IsoWeekday>,
    ) -> TimelineResult<u64>;

    /// Soft-deletes the worker together with its schedules.
    async fn retire_worker(&self, org_id: Uuid, worker_id: Uuid) -> TimelineResult<()>;
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Materializes next week's slots for every active schedule, all or nothing.
    async fn generate_slots(&self) -> TimelineResult<GenerationReport>;

    /// Deletes free slots dated today or earlier. Returns the number removed.
    async fn delete_expired_slots(&self) -> TimelineResult<u64>;

    async fn slots(&self, query: SlotQuery) -> TimelineResult<Vec<Slot>>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Claims the slot and inserts the record atomically.
    async fn book(&self, request: BookingRequest) -> TimelineResult<BookedRecord>;

    /// Marks the record canceled and frees its slot, if the cutoff allows.
    async fn cancel(&self, record_id: Uuid, reason: String, cutoff: CutoffPolicy) -> TimelineResult<CancellationPayload>;

    async fn record(&self, record_id: Uuid) -> TimelineResult<RecordDetails>;

    async fn records(&self, query: RecordQuery) -> TimelineResult<RecordList>;

    async fn patch_record(&self, record_id: Uuid, patch: RecordPatch) -> TimelineResult<Record>;

    /// Physically removes a record before the cutoff and frees its slot.
    async fn delete_record(&self, record_id: Uuid, cutoff: CutoffPolicy) -> TimelineResult<()>;

    /// Active records whose session starts within the next `window_minutes`.
    async fn upcoming_reminders(&self, window_minutes: u32) -> TimelineResult<Vec<ReminderPayload>>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Inserts feedback only once the session has ended, and marks the record reviewed.
    async fn set_feedback(&self, request: FeedbackRequest) -> TimelineResult<Feedback>;

    async fn update_feedback(&self, request: FeedbackRequest) -> TimelineResult<Feedback>;

    /// Removes the feedback and clears the record's reviewed flag.
    async fn delete_feedback(&self, record_id: Uuid, user_id: Uuid) -> TimelineResult<()>;

    async fn feedbacks(&self, query: FeedbackQuery) -> TimelineResult<Vec<Feedback>>;
}
