use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/records",
            post(handlers::booking::book).get(handlers::booking::list_records),
        )
        .route(
            "/api/records/:record_id",
            get(handlers::booking::get_record)
                .patch(handlers::booking::patch_record)
                .delete(handlers::booking::delete_record),
        )
        .route("/api/records/:record_id/cancel", post(handlers::booking::cancel))
}
