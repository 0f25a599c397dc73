use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use timeline_core::models::{
    notification::CancellationPayload,
    record::{BookingRequest, CancelRequest, Record, RecordDetails, RecordList, RecordPatch, RecordQuery},
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub reason: String,
}

/// Books a slot. A slot that was taken first answers `409 Conflict`.
#[axum::debug_handler]
pub async fn book(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let record = state.engine.allocator.book(payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[axum::debug_handler]
pub async fn get_record(
    State(state): State<Arc<ApiState>>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<RecordDetails>, AppError> {
    let record = state.engine.allocator.record(record_id).await?;
    Ok(Json(record))
}

#[axum::debug_handler]
pub async fn list_records(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<RecordList>, AppError> {
    let records = state.engine.allocator.records(query).await?;
    Ok(Json(records))
}

#[axum::debug_handler]
pub async fn patch_record(
    State(state): State<Arc<ApiState>>,
    Path(record_id): Path<Uuid>,
    Json(payload): Json<RecordPatch>,
) -> Result<Json<Record>, AppError> {
    let record = state.engine.allocator.patch(record_id, payload).await?;
    Ok(Json(record))
}

#[axum::debug_handler]
pub async fn cancel(
    State(state): State<Arc<ApiState>>,
    Path(record_id): Path<Uuid>,
    Json(payload): Json<CancelBody>,
) -> Result<Json<CancellationPayload>, AppError> {
    let request = CancelRequest {
        record_id,
        reason: payload.reason,
    };
    let canceled = state.engine.cancellations.cancel(request).await?;
    Ok(Json(canceled))
}

#[axum::debug_handler]
pub async fn delete_record(
    State(state): State<Arc<ApiState>>,
    Path(record_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.engine.cancellations.delete(record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
