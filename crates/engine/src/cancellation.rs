use std::sync::Arc;

use timeline_core::{
    errors::TimelineResult,
    models::{
        notification::{CancellationPayload, Notification},
        record::CancelRequest,
    },
    scheduling::CutoffPolicy,
    store::RecordStore,
};
use uuid::Uuid;

use crate::notifier::Notifier;

/// Cancels and deletes records while their session is still outside the cutoff.
///
/// Both paths share one `CutoffPolicy`: a session starting within the buffer
/// can no longer be canceled or deleted.
#[derive(Clone)]
pub struct CancellationHandler {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    cutoff: CutoffPolicy,
}

impl CancellationHandler {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>, cutoff: CutoffPolicy) -> Self {
        Self { store, notifier, cutoff }
    }

    pub fn cutoff(&self) -> CutoffPolicy {
        self.cutoff
    }

    /// Marks the record canceled and frees its slot for rebooking.
    #[tracing::instrument(skip(self, request), fields(record_id = %request.record_id))]
    pub async fn cancel(&self, request: CancelRequest) -> TimelineResult<CancellationPayload> {
        let payload = self.store.cancel(request.record_id, request.reason, self.cutoff).await?;
        self.notifier.dispatch(Notification::Cancellation(payload.clone()));
        Ok(payload)
    }

    /// Administrative removal of a record; its slot becomes free again.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, record_id: Uuid) -> TimelineResult<()> {
        self.store.delete_record(record_id, self.cutoff).await
    }
}
