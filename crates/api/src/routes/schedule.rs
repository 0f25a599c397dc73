use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schedules",
            post(handlers::schedule::add_schedule).put(handlers::schedule::update_schedule),
        )
        .route("/api/orgs/:org_id/schedules", get(handlers::schedule::list_schedules))
        .route(
            "/api/orgs/:org_id/workers/:worker_id/schedules",
            delete(handlers::schedule::delete_schedule),
        )
        .route(
            "/api/orgs/:org_id/workers/:worker_id",
            delete(handlers::schedule::retire_worker),
        )
}
