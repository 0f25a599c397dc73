use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use std::sync::Arc;
use timeline_core::models::timetable::{Timetable, TimetableRequest, TimetableResponse};
use uuid::Uuid;

use super::WeekdayParam;
use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

#[axum::debug_handler]
pub async fn get_timetable(
    State(state): State<Arc<ApiState>>,
    Path(org_id): Path<Uuid>,
) -> Result<Json<TimetableResponse>, AppError> {
    let timetable = state.engine.timetables.timetable(org_id).await?;
    Ok(Json(timetable))
}

#[axum::debug_handler]
pub async fn add_timetable(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<TimetableRequest>,
) -> Result<Json<Vec<Timetable>>, AppError> {
    let added = state.engine.timetables.add(payload).await?;
    Ok(Json(added))
}

#[axum::debug_handler]
pub async fn update_timetable(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<TimetableRequest>,
) -> Result<Json<Vec<Timetable>>, AppError> {
    let updated = state.engine.timetables.update(payload).await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_timetable(
    State(state): State<Arc<ApiState>>,
    Path(org_id): Path<Uuid>,
    Query(params): Query<WeekdayParam>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = state.engine.timetables.delete(org_id, params.weekday).await?;
    Ok(Json(DeletedResponse { deleted }))
}
