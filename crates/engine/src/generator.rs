use std::sync::Arc;

use timeline_core::{
    errors::TimelineResult,
    models::slot::{GenerationReport, Slot, SlotQuery},
    store::SlotStore,
};

/// Expands active worker schedules into next week's bookable slots.
///
/// A run is all-or-nothing: any failure leaves no slot behind and the next
/// scheduled run starts over. Re-running is harmless, already generated
/// sessions are counted as duplicates.
#[derive(Clone)]
pub struct SlotGenerator {
    store: Arc<dyn SlotStore>,
}

impl SlotGenerator {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> TimelineResult<GenerationReport> {
        match self.store.generate_slots().await {
            Ok(report) => {
                tracing::info!(
                    "Slot generation finished: schedules={}, created={}, duplicates={}, skipped_in_break={}, skipped_schedules={}",
                    report.target_schedules,
                    report.created,
                    report.duplicates,
                    report.skipped_in_break,
                    report.skipped_schedules
                );
                Ok(report)
            }
            Err(err) => {
                tracing::error!("Slot generation aborted: {}", err);
                Err(err)
            }
        }
    }

    /// Slots from today on, free and busy.
    pub async fn slots(&self, query: SlotQuery) -> TimelineResult<Vec<Slot>> {
        self.store.slots(query).await
    }
}
