//! # Timeline Engine
//!
//! The scheduling and booking components, each wired to the store trait it
//! needs and to the notification seam:
//!
//! - [`TimetableManager`] and [`ScheduleManager`] author operating hours and
//!   worker availability
//! - [`SlotGenerator`] expands availability into next week's slots
//! - [`SlotAllocator`] books slots and serves records
//! - [`CancellationHandler`] cancels and deletes bookings before the cutoff
//! - [`FeedbackGate`] accepts ratings once a session has ended
//! - [`ExpiryReaper`] removes free slots that can no longer be booked
//!
//! [`jobs::DailyJob`] drives the generator, the reaper and reminders from the wall clock.

pub mod allocator;
pub mod cancellation;
pub mod config;
pub mod feedback;
pub mod generator;
pub mod jobs;
pub mod notifier;
pub mod reaper;
pub mod schedule;
pub mod timetable;

use std::sync::Arc;

use timeline_core::store::{FeedbackStore, RecordStore, ScheduleStore, SlotStore, TimetableStore};

pub use allocator::SlotAllocator;
pub use cancellation::CancellationHandler;
pub use config::EngineConfig;
pub use feedback::FeedbackGate;
pub use generator::SlotGenerator;
pub use notifier::{ChannelNotifier, Notifier, TracingNotifier};
pub use reaper::ExpiryReaper;
pub use schedule::ScheduleManager;
pub use timetable::TimetableManager;

/// Every component, sharing one store and one notifier.
#[derive(Clone)]
pub struct Engine {
    pub timetables: TimetableManager,
    pub schedules: ScheduleManager,
    pub generator: SlotGenerator,
    pub allocator: SlotAllocator,
    pub cancellations: CancellationHandler,
    pub feedback: FeedbackGate,
    pub reaper: ExpiryReaper,
    pub config: EngineConfig,
}

impl Engine {
    pub fn new<S>(store: Arc<S>, notifier: Arc<dyn Notifier>, config: EngineConfig) -> Self
    where
        S: TimetableStore + ScheduleStore + SlotStore + RecordStore + FeedbackStore + 'static,
    {
        Self {
            timetables: TimetableManager::new(store.clone()),
            schedules: ScheduleManager::new(store.clone()),
            generator: SlotGenerator::new(store.clone()),
            allocator: SlotAllocator::new(store.clone(), notifier.clone()),
            cancellations: CancellationHandler::new(store.clone(), notifier, config.cutoff()),
            feedback: FeedbackGate::new(store.clone()),
            reaper: ExpiryReaper::new(store),
            config,
        }
    }

    pub fn daily_job(&self) -> jobs::DailyJob {
        jobs::DailyJob::new(
            self.reaper.clone(),
            self.generator.clone(),
            self.allocator.clone(),
            self.config,
        )
    }
}
