//! # Engine Configuration
//!
//! Booking rules and job timing, read from environment variables:
//!
//! - `CANCEL_CUTOFF_MINUTES`: how long before a session cancellation and
//!   deletion close (default: 120)
//! - `SLOT_JOB_HOUR`: UTC hour at which the daily expiry and generation run
//!   (default: 16)
//! - `REMINDER_WINDOW_MINUTES`: how far ahead upcoming sessions are reminded
//!   (default: 120)

use std::env;

use eyre::{Result, WrapErr, eyre};
use timeline_core::scheduling::CutoffPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub cancel_cutoff_minutes: u32,
    pub job_hour: u32,
    pub reminder_window_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cancel_cutoff_minutes: CutoffPolicy::DEFAULT_BUFFER_MINUTES,
            job_hour: 16,
            reminder_window_minutes: 120,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: u32| -> Result<u32> {
            match lookup(key) {
                Some(value) => value
                    .trim()
                    .parse()
                    .wrap_err_with(|| format!("Invalid {key} value: {value}")),
                None => Ok(default),
            }
        };

        let config = Self {
            cancel_cutoff_minutes: read("CANCEL_CUTOFF_MINUTES", defaults.cancel_cutoff_minutes)?,
            job_hour: read("SLOT_JOB_HOUR", defaults.job_hour)?,
            reminder_window_minutes: read("REMINDER_WINDOW_MINUTES", defaults.reminder_window_minutes)?,
        };
        if config.job_hour > 23 {
            return Err(eyre!("SLOT_JOB_HOUR must be within 0..=23, got {}", config.job_hour));
        }
        Ok(config)
    }

    pub fn cutoff(&self) -> CutoffPolicy {
        CutoffPolicy::new(self.cancel_cutoff_minutes)
    }
}
