use std::sync::Arc;

use timeline_core::{
    errors::{TimelineError, TimelineResult},
    models::feedback::{Feedback, FeedbackQuery, FeedbackRequest, MAX_STARS, MIN_STARS},
    store::FeedbackStore,
};
use uuid::Uuid;

/// Post-session ratings, one per record.
///
/// Whether the session has ended is decided by the store inside the insert,
/// never by a separate read here.
#[derive(Clone)]
pub struct FeedbackGate {
    store: Arc<dyn FeedbackStore>,
}

fn validate_stars(stars: i16) -> TimelineResult<()> {
    if !(MIN_STARS..=MAX_STARS).contains(&stars) {
        return Err(TimelineError::Validation(format!(
            "stars must be within {MIN_STARS}..={MAX_STARS}, got {stars}"
        )));
    }
    Ok(())
}

impl FeedbackGate {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, request), fields(record_id = %request.record_id))]
    pub async fn set(&self, request: FeedbackRequest) -> TimelineResult<Feedback> {
        validate_stars(request.stars)?;
        self.store.set_feedback(request).await
    }

    #[tracing::instrument(skip(self, request), fields(record_id = %request.record_id))]
    pub async fn update(&self, request: FeedbackRequest) -> TimelineResult<Feedback> {
        validate_stars(request.stars)?;
        self.store.update_feedback(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, record_id: Uuid, user_id: Uuid) -> TimelineResult<()> {
        self.store.delete_feedback(record_id, user_id).await
    }

    pub async fn feedbacks(&self, query: FeedbackQuery) -> TimelineResult<Vec<Feedback>> {
        self.store.feedbacks(query).await
    }
}
