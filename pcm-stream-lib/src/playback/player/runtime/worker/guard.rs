//! Liveness guard for scheduler threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Guard that keeps `scheduler_thread_exists` in sync with worker lifetime.
pub(super) struct SchedulerThreadGuard {
    exists: Arc<AtomicBool>,
}

impl SchedulerThreadGuard {
    /// Mark the thread as alive.
    pub(super) fn new(exists: Arc<AtomicBool>) -> Self {
        exists.store(true, Ordering::SeqCst);
        Self { exists }
    }
}

impl Drop for SchedulerThreadGuard {
    fn drop(&mut self) {
        self.exists.store(false, Ordering::SeqCst);
    }
}
