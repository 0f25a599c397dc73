use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use timeline_core::models::feedback::{Feedback, FeedbackQuery, FeedbackRequest};
use uuid::Uuid;

use super::UserParam;
use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_feedback(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<FeedbackQuery>,
) -> Result<Json<Vec<Feedback>>, AppError> {
    let feedback = state.engine.feedback.feedbacks(query).await?;
    Ok(Json(feedback))
}

#[axum::debug_handler]
pub async fn set_feedback(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    let feedback = state.engine.feedback.set(payload).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

#[axum::debug_handler]
pub async fn update_feedback(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<Feedback>, AppError> {
    let feedback = state.engine.feedback.update(payload).await?;
    Ok(Json(feedback))
}

#[axum::debug_handler]
pub async fn delete_feedback(
    State(state): State<Arc<ApiState>>,
    Path(record_id): Path<Uuid>,
    Query(params): Query<UserParam>,
) -> Result<StatusCode, AppError> {
    state.engine.feedback.delete(record_id, params.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
