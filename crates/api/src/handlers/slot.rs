use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use timeline_core::models::slot::{Slot, SlotQuery};

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let slots = state.engine.generator.slots(query).await?;
    Ok(Json(slots))
}
