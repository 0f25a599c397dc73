use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use timeline_core::models::{
    schedule::{ScheduleQuery, WorkerSchedule, WorkerScheduleRequest, WorkerWeek},
    time::IsoWeekday,
};
use uuid::Uuid;

use super::{WeekdayParam, timetable::DeletedResponse};
use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleFilter {
    #[serde(default)]
    pub worker_id: Option<Uuid>,
    #[serde(default)]
    pub weekday: Option<IsoWeekday>,
}

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<ApiState>>,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<ScheduleFilter>,
) -> Result<Json<Vec<WorkerWeek>>, AppError> {
    let query = ScheduleQuery {
        org_id,
        worker_id: filter.worker_id,
        weekday: filter.weekday,
    };
    let weeks = state.engine.schedules.schedules(query).await?;
    Ok(Json(weeks))
}

#[axum::debug_handler]
pub async fn add_schedule(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<WorkerScheduleRequest>,
) -> Result<(StatusCode, Json<Vec<WorkerSchedule>>), AppError> {
    let created = state.engine.schedules.add(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<WorkerScheduleRequest>,
) -> Result<Json<Vec<WorkerSchedule>>, AppError> {
    let updated = state.engine.schedules.update(payload).await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<Arc<ApiState>>,
    Path((org_id, worker_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<WeekdayParam>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = state.engine.schedules.delete(org_id, worker_id, params.weekday).await?;
    Ok(Json(DeletedResponse { deleted }))
}

#[axum::debug_handler]
pub async fn retire_worker(
    State(state): State<Arc<ApiState>>,
    Path((org_id, worker_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.engine.schedules.retire_worker(org_id, worker_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
