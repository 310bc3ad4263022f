use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{DEFAULT_COMPLETION_POLL_MS, DEFAULT_IDLE_BACKOFF_MS};

use super::Player;

/// What to do when the output device cannot be opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceFailurePolicy {
    /// Log the failure and keep running without audible output.
    #[default]
    Degrade,
    /// Reject player creation with a device error.
    Fail,
}

/// Tunables for scheduling, completion waits and output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Delay before re-checking an empty queue (ms).
    pub idle_backoff_ms: u64,
    /// Upper bound between completion checks (ms).
    pub completion_poll_ms: u64,
    /// Buffers allowed in the sink at once. `0` disables the limit.
    pub max_in_flight_buffers: usize,
    pub volume: f32,
    pub device_failure: DeviceFailurePolicy,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            idle_backoff_ms: DEFAULT_IDLE_BACKOFF_MS,
            completion_poll_ms: DEFAULT_COMPLETION_POLL_MS,
            max_in_flight_buffers: 0,
            volume: 1.0,
            device_failure: DeviceFailurePolicy::Degrade,
        }
    }
}

impl PlayerSettings {
    /// Copy with out-of-range values pulled back to usable ones.
    pub fn sanitized(mut self) -> Self {
        self.idle_backoff_ms = self.idle_backoff_ms.max(1);
        self.completion_poll_ms = self.completion_poll_ms.max(1);
        self.volume = sanitize_volume(self.volume);
        self
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn completion_poll(&self) -> Duration {
        Duration::from_millis(self.completion_poll_ms)
    }
}

fn sanitize_volume(volume: f32) -> f32 {
    if !volume.is_finite() {
        return 1.0;
    }
    volume.max(0.0)
}

impl Player {
    /// Configure the empty-queue backoff (ms). Values below 1 are raised to 1.
    pub fn set_idle_backoff_ms(&self, ms: u64) {
        let mut settings = self.settings.lock().unwrap();
        settings.idle_backoff_ms = ms.max(1);
    }

    /// Configure the completion wait poll interval (ms).
    pub fn set_completion_poll_ms(&self, ms: u64) {
        let mut settings = self.settings.lock().unwrap();
        settings.completion_poll_ms = ms.max(1);
    }

    /// Configure the maximum buffers queued in the sink.
    ///
    /// Set to `0` to disable this guard.
    pub fn set_max_in_flight_buffers(&self, buffers: usize) {
        let mut settings = self.settings.lock().unwrap();
        settings.max_in_flight_buffers = buffers;
    }

    /// Set output volume; takes effect immediately.
    pub fn set_volume(&self, volume: f32) {
        let volume = sanitize_volume(volume);
        self.settings.lock().unwrap().volume = volume;
        self.sink.lock().unwrap().set_volume(volume);
    }

    pub fn settings(&self) -> PlayerSettings {
        *self.settings.lock().unwrap()
    }
}
