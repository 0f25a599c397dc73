use std::sync::Arc;

use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::{
        notification::Notification,
        record::{BookingRequest, Record, RecordDetails, RecordList, RecordPatch, RecordQuery},
    },
    store::RecordStore,
};
use uuid::Uuid;

use crate::notifier::Notifier;

const MAX_PAGE_SIZE: i64 = 100;

/// Books free slots and serves the records they produce.
///
/// The claim of the slot and the creation of the record commit together in
/// the store; two callers racing for one slot get one record and one
/// `Conflict`. The reminder is handed to the notifier only after commit.
#[derive(Clone)]
pub struct SlotAllocator {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl SlotAllocator {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    #[tracing::instrument(skip(self, request), fields(slot_id = %request.slot_id, user_id = %request.user_id))]
    pub async fn book(&self, request: BookingRequest) -> TimelineResult<Record> {
        let booked = self.store.book(request).await?;
        self.notifier.dispatch(Notification::Reminder(booked.reminder));
        Ok(booked.record)
    }

    pub async fn record(&self, record_id: Uuid) -> TimelineResult<RecordDetails> {
        self.store.record(record_id).await
    }

    pub async fn records(&self, query: RecordQuery) -> TimelineResult<RecordList> {
        if query.limit < 1 || query.limit > MAX_PAGE_SIZE {
            return Err(TimelineError::Validation(format!(
                "limit must be within 1..={MAX_PAGE_SIZE}, got {}",
                query.limit
            )));
        }
        if query.offset < 0 {
            return Err(TimelineError::Validation(format!(
                "offset must not be negative, got {}",
                query.offset
            )));
        }
        self.store.records(query).await
    }

    /// Reassigns the user, worker or service of a record.
    #[tracing::instrument(skip(self, patch))]
    pub async fn patch(&self, record_id: Uuid, patch: RecordPatch) -> TimelineResult<Record> {
        if patch.is_empty() {
            return Err(TimelineError::Validation("record patch has no fields".into()));
        }
        self.store.patch_record(record_id, patch).await
    }

    /// Re-sends reminders for sessions starting within the window. Returns how many were sent.
    #[tracing::instrument(skip(self))]
    pub async fn remind_upcoming(&self, window_minutes: u32) -> TimelineResult<usize> {
        let reminders = self.store.upcoming_reminders(window_minutes).await?;
        let sent = reminders.len();
        for reminder in reminders {
            self.notifier.dispatch(Notification::Reminder(reminder));
        }
        tracing::info!("Upcoming session reminders dispatched: {}", sent);
        Ok(sent)
    }
}
