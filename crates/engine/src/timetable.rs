use std::sync::Arc;

use timeline_core::{
    errors::TimelineResult,
    models::{
        time::IsoWeekday,
        timetable::{OpenHours, Timetable, TimetableRequest, TimetableResponse},
    },
    scheduling::validate_timetable_request,
    store::TimetableStore,
};
use uuid::Uuid;

/// Organization operating hours, one entry per weekday.
#[derive(Clone)]
pub struct TimetableManager {
    store: Arc<dyn TimetableStore>,
}

impl TimetableManager {
    pub fn new(store: Arc<dyn TimetableStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn timetable(&self, org_id: Uuid) -> TimelineResult<TimetableResponse> {
        let days = self.store.timetable(org_id).await?;
        Ok(TimetableResponse {
            org_id,
            timetable: days.into_iter().map(OpenHours::from).collect(),
        })
    }

    #[tracing::instrument(skip(self, request), fields(org_id = %request.org_id))]
    pub async fn add(&self, request: TimetableRequest) -> TimelineResult<Vec<Timetable>> {
        validate_timetable_request(&request.timetable)?;
        self.store.add_timetable(request.org_id, request.timetable).await
    }

    /// Replaces the hours of existing weekdays. Active schedules must still fit.
    #[tracing::instrument(skip(self, request), fields(org_id = %request.org_id))]
    pub async fn update(&self, request: TimetableRequest) -> TimelineResult<Vec<Timetable>> {
        validate_timetable_request(&request.timetable)?;
        self.store.update_timetable(request.org_id, request.timetable).await
    }

    /// Removes one weekday, or the whole week, and retires the schedules built on it.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, org_id: Uuid, weekday: Option<IsoWeekday>) -> TimelineResult<u64> {
        self.store.delete_timetable(org_id, weekday).await
    }
}
