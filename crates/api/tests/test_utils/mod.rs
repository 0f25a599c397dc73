use std::sync::Arc;

use axum_test::TestServer;
use timeline_api::ApiState;
use timeline_db::mock::repositories::{MockFeedbackRepo, MockRecordRepo, MockScheduleRepo, MockSlotRepo, MockTimetableRepo};
use timeline_engine::{
    CancellationHandler, Engine, EngineConfig, ExpiryReaper, FeedbackGate, Notifier, ScheduleManager, SlotAllocator,
    SlotGenerator, TimetableManager, TracingNotifier,
};

/// One mock per store; set expectations, then build the server.
pub struct TestContext {
    pub timetable_repo: MockTimetableRepo,
    pub schedule_repo: MockScheduleRepo,
    pub slot_repo: MockSlotRepo,
    pub record_repo: MockRecordRepo,
    pub feedback_repo: MockFeedbackRepo,
    pub config: EngineConfig,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            timetable_repo: MockTimetableRepo::new(),
            schedule_repo: MockScheduleRepo::new(),
            slot_repo: MockSlotRepo::new(),
            record_repo: MockRecordRepo::new(),
            feedback_repo: MockFeedbackRepo::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn build_state(self) -> Arc<ApiState> {
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
        let slots = Arc::new(self.slot_repo);
        let records = Arc::new(self.record_repo);

        let engine = Engine {
            timetables: TimetableManager::new(Arc::new(self.timetable_repo)),
            schedules: ScheduleManager::new(Arc::new(self.schedule_repo)),
            generator: SlotGenerator::new(slots.clone()),
            allocator: SlotAllocator::new(records.clone(), notifier.clone()),
            cancellations: CancellationHandler::new(records, notifier, self.config.cutoff()),
            feedback: FeedbackGate::new(Arc::new(self.feedback_repo)),
            reaper: ExpiryReaper::new(slots),
            config: self.config,
        };

        Arc::new(ApiState { engine })
    }

    pub fn server(self) -> TestServer {
        TestServer::new(timeline_api::app(self.build_state())).unwrap()
    }
}
