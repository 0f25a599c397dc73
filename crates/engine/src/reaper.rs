use std::sync::Arc;

use timeline_core::{errors::TimelineResult, store::SlotStore};

/// Removes free slots whose day has come. Busy slots are history and stay.
#[derive(Clone)]
pub struct ExpiryReaper {
    store: Arc<dyn SlotStore>,
}

impl ExpiryReaper {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> TimelineResult<u64> {
        let deleted = self.store.delete_expired_slots().await.inspect_err(|err| {
            tracing::error!("Expiry sweep failed: {}", err);
        })?;
        tracing::info!("Expired slots deleted: {}", deleted);
        Ok(deleted)
    }
}
