use axum::{
    Router,
    routing::{delete, get},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/feedback",
            get(handlers::feedback::list_feedback)
                .post(handlers::feedback::set_feedback)
                .put(handlers::feedback::update_feedback),
        )
        .route(
            "/api/records/:record_id/feedback",
            delete(handlers::feedback::delete_feedback),
        )
}
