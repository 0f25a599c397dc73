use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_STARS: i16 = 1;
pub const MAX_STARS: i16 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback_id: Uuid,
    pub record_id: Uuid,
    pub stars: i16,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Feedback submission; `user_id` is the acting user and must own the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub record_id: Uuid,
    pub user_id: Uuid,
    pub stars: i16,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackQuery {
    #[serde(default)]
    pub record_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub org_id: Option<Uuid>,
}
