use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/timetable",
            post(handlers::timetable::add_timetable).put(handlers::timetable::update_timetable),
        )
        .route(
            "/api/orgs/:org_id/timetable",
            get(handlers::timetable::get_timetable).delete(handlers::timetable::delete_timetable),
        )
}
