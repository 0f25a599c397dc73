use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized booking data sent to the user after booking and before the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub user_email: String,
    pub service_name: String,
    pub service_description: String,
    pub org_name: String,
    pub org_address: String,
    pub session_date: NaiveDate,
    pub session_begin: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationPayload {
    #[serde(flatten)]
    pub session: ReminderPayload,
    pub cancel_reason: String,
}

/// Message handed to the delivery collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Reminder(ReminderPayload),
    Cancellation(CancellationPayload),
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::Reminder(reminder) => &reminder.user_email,
            Notification::Cancellation(cancellation) => &cancellation.session.user_email,
        }
    }
}
