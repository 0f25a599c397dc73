use std::sync::Arc;

use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::{
        schedule::{ScheduleQuery, WorkerSchedule, WorkerScheduleRequest, WorkerWeek},
        time::IsoWeekday,
    },
    scheduling::{validate_schedule_day, validate_session_duration},
    store::ScheduleStore,
};
use uuid::Uuid;

/// Workers' recurring weekly availability.
#[derive(Clone)]
pub struct ScheduleManager {
    store: Arc<dyn ScheduleStore>,
}

/// Checks the parts of a schedule request that need no stored state.
fn validate_request(request: &WorkerScheduleRequest) -> TimelineResult<()> {
    if request.schedule.is_empty() {
        return Err(TimelineError::Validation("schedule must not be empty".into()));
    }
    if request.session_duration > 0 {
        validate_session_duration(request.session_duration)?;
    }
    let mut seen = [false; 8];
    for day in &request.schedule {
        validate_schedule_day(day)?;
        let slot = &mut seen[usize::from(day.weekday.number())];
        if *slot {
            return Err(TimelineError::Validation(format!("{} appears more than once", day.weekday)));
        }
        *slot = true;
    }
    Ok(())
}

impl ScheduleManager {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn schedules(&self, query: ScheduleQuery) -> TimelineResult<Vec<WorkerWeek>> {
        self.store.worker_schedules(query).await
    }

    /// Adds weekdays to a worker's schedule. Each must fit the org's timetable for that day.
    #[tracing::instrument(skip(self, request), fields(worker_id = %request.worker_id, org_id = %request.org_id))]
    pub async fn add(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>> {
        validate_request(&request)?;
        self.store.add_worker_schedule(request).await
    }

    #[tracing::instrument(skip(self, request), fields(worker_id = %request.worker_id, org_id = %request.org_id))]
    pub async fn update(&self, request: WorkerScheduleRequest) -> TimelineResult<Vec<WorkerSchedule>> {
        validate_request(&request)?;
        if let Some(day) = request.schedule.iter().find(|day| day.worker_schedule_id.is_none()) {
            return Err(TimelineError::Validation(format!(
                "{}: worker_schedule_id is required to update a schedule",
                day.weekday
            )));
        }
        self.store.update_worker_schedule(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, org_id: Uuid, worker_id: Uuid, weekday: Option<IsoWeekday>) -> TimelineResult<u64> {
        self.store.soft_delete_worker_schedule(org_id, worker_id, weekday).await
    }

    /// Soft-deletes the worker; no further slots are generated for it.
    #[tracing::instrument(skip(self))]
    pub async fn retire_worker(&self, org_id: Uuid, worker_id: Uuid) -> TimelineResult<()> {
        self.store.retire_worker(org_id, worker_id).await
    }
}
