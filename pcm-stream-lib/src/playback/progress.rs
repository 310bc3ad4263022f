//! Submitted/played counters and the completion wait built on them.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::error::PlayerError;

/// Point-in-time view of the playback counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Samples accepted from producers.
    pub submitted: u64,
    /// Samples the sink reported as played.
    pub played: u64,
}

impl ProgressSnapshot {
    /// Samples accepted but not yet heard.
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.played)
    }

    pub fn is_drained(&self) -> bool {
        self.played >= self.submitted
    }
}

/// Monotonic progress counters with change notification.
///
/// `played` never exceeds `submitted`. Every change wakes waiters so the
/// completion wait does not depend on the poll interval alone.
#[derive(Debug, Default)]
pub struct PlaybackProgress {
    counters: Mutex<ProgressSnapshot>,
    changed: Condvar,
}

impl PlaybackProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self, samples: u64) {
        let mut counters = self.counters.lock().unwrap();
        counters.submitted = counters.submitted.saturating_add(samples);
        drop(counters);
        self.changed.notify_all();
    }

    /// Credit `samples` as played, clamped to what has been submitted.
    pub fn record_played(&self, samples: u64) {
        let mut counters = self.counters.lock().unwrap();
        counters.played = counters
            .played
            .saturating_add(samples)
            .min(counters.submitted);
        drop(counters);
        self.changed.notify_all();
    }

    /// Take back `samples` that were queued but will never be played.
    pub fn record_discarded(&self, samples: u64) {
        let mut counters = self.counters.lock().unwrap();
        counters.submitted = counters
            .submitted
            .saturating_sub(samples)
            .max(counters.played);
        drop(counters);
        self.changed.notify_all();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.counters.lock().unwrap()
    }

    pub fn is_drained(&self) -> bool {
        self.snapshot().is_drained()
    }

    /// Wake every waiter without changing the counters.
    pub fn notify(&self) {
        self.changed.notify_all();
    }

    /// Block until every submitted sample has been played.
    ///
    /// Re-checks at least every `poll_interval`. Returns
    /// [`PlayerError::Aborted`] as soon as `abort` is raised, even if the
    /// counters have since been rolled back to drained.
    pub fn wait_for_completion(
        &self,
        poll_interval: Duration,
        abort: &AtomicBool,
    ) -> Result<(), PlayerError> {
        let mut counters = self.counters.lock().unwrap();
        loop {
            // Teardown rolls `submitted` back, so abort must win over drained.
            if abort.load(Ordering::SeqCst) {
                return Err(PlayerError::Aborted);
            }
            if counters.is_drained() {
                return Ok(());
            }
            let (guard, _) = self.changed.wait_timeout(counters, poll_interval).unwrap();
            counters = guard;
        }
    }
}
