//! Wall-clock driven maintenance: the daily expiry sweep and slot generation,
//! and periodic reminders for sessions that are about to start.

use std::future::Future;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use timeline_core::models::slot::GenerationReport;

use crate::{EngineConfig, ExpiryReaper, SlotAllocator, SlotGenerator};

/// Outcome of one daily run. `None` marks a step that failed and was logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailySummary {
    pub expired: Option<u64>,
    pub generation: Option<GenerationReport>,
}

/// First instant at `hour:00` UTC strictly after `now`.
pub fn next_run_at(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();
    let today = now.date_naive().and_time(at).and_utc();
    if today > now { today } else { today + Duration::days(1) }
}

#[derive(Clone)]
pub struct DailyJob {
    reaper: ExpiryReaper,
    generator: SlotGenerator,
    allocator: SlotAllocator,
    config: EngineConfig,
}

impl DailyJob {
    pub fn new(reaper: ExpiryReaper, generator: SlotGenerator, allocator: SlotAllocator, config: EngineConfig) -> Self {
        Self {
            reaper,
            generator,
            allocator,
            config,
        }
    }

    /// Sweeps expired slots, then generates next week's. A failed sweep does not stop generation.
    pub async fn run_daily(&self) -> DailySummary {
        let expired = self.reaper.run().await.ok();
        let generation = self.generator.run().await.ok();
        DailySummary { expired, generation }
    }

    pub async fn run_reminders(&self) -> Option<usize> {
        self.allocator
            .remind_upcoming(self.config.reminder_window_minutes)
            .await
            .inspect_err(|err| tracing::error!("Reminder dispatch failed: {}", err))
            .ok()
    }

    /// Runs until `shutdown` resolves: the daily steps at the configured hour and
    /// reminders once per reminder window.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let period = StdDuration::from_secs(u64::from(self.config.reminder_window_minutes.max(1)) * 60);
        let mut reminders = tokio::time::interval(period);

        loop {
            let now = Utc::now();
            let next = next_run_at(now, self.config.job_hour);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!("Next daily run at {}", next);

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Slot jobs stopping");
                    break;
                }
                _ = tokio::time::sleep(wait) => {
                    self.run_daily().await;
                }
                _ = reminders.tick() => {
                    self.run_reminders().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case((2024, 6, 10, 9, 30), (2024, 6, 10, 16))]
    #[case((2024, 6, 10, 16, 0), (2024, 6, 11, 16))]
    #[case((2024, 6, 10, 23, 59), (2024, 6, 11, 16))]
    #[case((2024, 12, 31, 17, 0), (2025, 1, 1, 16))]
    fn test_next_run_at(#[case] now: (i32, u32, u32, u32, u32), #[case] expected: (i32, u32, u32, u32)) {
        let now = Utc.with_ymd_and_hms(now.0, now.1, now.2, now.3, now.4, 0).unwrap();
        let expected = Utc
            .with_ymd_and_hms(expected.0, expected.1, expected.2, expected.3, 0, 0)
            .unwrap();
        assert_eq!(next_run_at(now, 16), expected);
    }
}
