//! Hand-off of reminder and cancellation payloads to the outbound dispatcher.
//!
//! Delivery is best-effort: dispatching never blocks the booking path and never
//! fails it. Whatever happens after the hand-off belongs to the dispatcher.

use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use timeline_core::models::notification::Notification;

pub trait Notifier: Send + Sync {
    fn dispatch(&self, notification: Notification);
}

/// Logs every notification. Used when no dispatcher is attached.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn dispatch(&self, notification: Notification) {
        match &notification {
            Notification::Reminder(reminder) => tracing::info!(
                "Reminder for {}: {} at {} ({})",
                reminder.user_email,
                reminder.service_name,
                reminder.session_begin,
                reminder.org_name
            ),
            Notification::Cancellation(cancellation) => tracing::info!(
                "Cancellation for {}: {} at {}, reason: {}",
                cancellation.session.user_email,
                cancellation.session.service_name,
                cancellation.session.session_begin,
                cancellation.cancel_reason
            ),
        }
    }
}

/// Queues notifications on a bounded channel drained by an external dispatcher.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> (Self, Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn dispatch(&self, notification: Notification) {
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!("Notification queue full, dropping message for {}", dropped.recipient());
            }
            Err(TrySendError::Closed(dropped)) => {
                tracing::warn!("Notification dispatcher is gone, dropping message for {}", dropped.recipient());
            }
        }
    }
}
