use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notification::ReminderPayload;

/// A booking of one slot by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub record_id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub worker_id: Uuid,
    pub service_id: Uuid,
    pub slot_id: Uuid,
    pub reviewed: bool,
    pub is_canceled: bool,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub worker_id: Uuid,
    pub service_id: Uuid,
    pub slot_id: Uuid,
}

/// A freshly committed booking plus the data handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedRecord {
    pub record: Record,
    pub reminder: ReminderPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub record_id: Uuid,
    pub reason: String,
}

/// Reassignment of an existing record; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub worker_id: Option<Uuid>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.worker_id.is_none() && self.service_id.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordQuery {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub org_id: Option<Uuid>,
    /// `true` lists sessions from today on, `false` lists past ones.
    #[serde(default)]
    pub fresh: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Record joined with the entities it references, as shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDetails {
    pub record_id: Uuid,
    pub reviewed: bool,
    pub is_canceled: bool,
    pub cancel_reason: Option<String>,
    pub service_name: String,
    pub service_cost: Option<f64>,
    pub worker_first_name: String,
    pub worker_last_name: String,
    pub org_name: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub session_date: NaiveDate,
    pub session_begin: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub stars: Option<i16>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordList {
    pub list: Vec<RecordDetails>,
    pub found: i64,
}
