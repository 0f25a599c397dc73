use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::{
        feedback::Feedback,
        notification::ReminderPayload,
        record::{Record, RecordDetails},
        schedule::{GenerationSource, WorkerSchedule},
        slot::Slot,
        time::IsoWeekday,
        timetable::Timetable,
    },
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimetable {
    pub org_id: Uuid,
    pub weekday: i16,
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
}

impl TryFrom<DbTimetable> for Timetable {
    type Error = TimelineError;

    fn try_from(row: DbTimetable) -> TimelineResult<Self> {
        Ok(Timetable {
            org_id: row.org_id,
            weekday: IsoWeekday::try_from(row.weekday)?,
            open: row.open.into(),
            close: row.close.into(),
            break_start: row.break_start.map(Into::into),
            break_end: row.break_end.map(Into::into),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWorkerSchedule {
    pub worker_schedule_id: Uuid,
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub weekday: i16,
    pub start: NaiveTime,
    pub over: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbWorkerSchedule> for WorkerSchedule {
    type Error = TimelineError;

    fn try_from(row: DbWorkerSchedule) -> TimelineResult<Self> {
        Ok(WorkerSchedule {
            worker_schedule_id: row.worker_schedule_id,
            worker_id: row.worker_id,
            org_id: row.org_id,
            weekday: IsoWeekday::try_from(row.weekday)?,
            start: row.start.into(),
            over: row.over.into(),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWorker {
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub session_duration: i32,
}

/// Active schedule joined with the worker and the org's timetable for the weekday.
#[derive(Debug, Clone, FromRow)]
pub struct DbGenerationSource {
    pub worker_schedule_id: Uuid,
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub weekday: i16,
    pub start: NaiveTime,
    pub over: NaiveTime,
    pub session_duration: i32,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
    pub has_timetable: bool,
}

impl TryFrom<DbGenerationSource> for GenerationSource {
    type Error = TimelineError;

    fn try_from(row: DbGenerationSource) -> TimelineResult<Self> {
        Ok(GenerationSource {
            worker_schedule_id: row.worker_schedule_id,
            worker_id: row.worker_id,
            org_id: row.org_id,
            weekday: IsoWeekday::try_from(row.weekday)?,
            start: row.start.into(),
            over: row.over.into(),
            session_duration: u32::try_from(row.session_duration).unwrap_or(0),
            break_start: row.break_start.map(Into::into),
            break_end: row.break_end.map(Into::into),
            has_timetable: row.has_timetable,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub slot_id: Uuid,
    pub worker_schedule_id: Uuid,
    pub worker_id: Uuid,
    pub org_id: Uuid,
    pub date: NaiveDate,
    pub session_begin: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub busy: bool,
}

impl From<DbSlot> for Slot {
    fn from(row: DbSlot) -> Self {
        Slot {
            slot_id: row.slot_id,
            worker_schedule_id: row.worker_schedule_id,
            worker_id: row.worker_id,
            org_id: row.org_id,
            date: row.date,
            begin: row.session_begin,
            end: row.session_end,
            busy: row.busy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRecord {
    pub record_id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub worker_id: Uuid,
    pub service_id: Uuid,
    pub slot_id: Uuid,
    pub reviewed: bool,
    pub is_canceled: bool,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbRecord> for Record {
    fn from(row: DbRecord) -> Self {
        Record {
            record_id: row.record_id,
            org_id: row.org_id,
            user_id: row.user_id,
            worker_id: row.worker_id,
            service_id: row.service_id,
            slot_id: row.slot_id,
            reviewed: row.reviewed,
            is_canceled: row.is_canceled,
            cancel_reason: row.cancel_reason,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRecordDetails {
    pub record_id: Uuid,
    pub reviewed: bool,
    pub is_canceled: bool,
    pub cancel_reason: Option<String>,
    pub service_name: String,
    pub service_cost: Option<f64>,
    pub worker_first_name: String,
    pub worker_last_name: String,
    pub org_name: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub date: NaiveDate,
    pub session_begin: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub stars: Option<i16>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbRecordDetails> for RecordDetails {
    fn from(row: DbRecordDetails) -> Self {
        RecordDetails {
            record_id: row.record_id,
            reviewed: row.reviewed,
            is_canceled: row.is_canceled,
            cancel_reason: row.cancel_reason,
            service_name: row.service_name,
            service_cost: row.service_cost,
            worker_first_name: row.worker_first_name,
            worker_last_name: row.worker_last_name,
            org_name: row.org_name,
            user_first_name: row.user_first_name,
            user_last_name: row.user_last_name,
            session_date: row.date,
            session_begin: row.session_begin,
            session_end: row.session_end,
            stars: row.stars,
            feedback: row.feedback,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbReminder {
    pub user_email: String,
    pub service_name: String,
    pub service_description: String,
    pub org_name: String,
    pub org_address: String,
    pub date: NaiveDate,
    pub session_begin: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
}

impl From<DbReminder> for ReminderPayload {
    fn from(row: DbReminder) -> Self {
        ReminderPayload {
            user_email: row.user_email,
            service_name: row.service_name,
            service_description: row.service_description,
            org_name: row.org_name,
            org_address: row.org_address,
            session_date: row.date,
            session_begin: row.session_begin,
            session_end: row.session_end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFeedback {
    pub feedback_id: Uuid,
    pub record_id: Uuid,
    pub stars: i16,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbFeedback> for Feedback {
    fn from(row: DbFeedback) -> Self {
        Feedback {
            feedback_id: row.feedback_id,
            record_id: row.record_id,
            stars: row.stars,
            text: row.feedback,
            created_at: row.created_at,
        }
    }
}
