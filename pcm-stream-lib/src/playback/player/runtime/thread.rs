//! Scheduler-thread bootstrap and shutdown for `Player`.

use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use log::error;

use super::super::Player;
use super::worker::{run_scheduler_thread, ThreadContext};

impl Player {
    /// Spawn a fresh scheduler loop and return its handle.
    ///
    /// Callers hold `scheduler_handle` so spawn and halt never interleave.
    pub(in crate::playback::player) fn spawn_scheduler(&self) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        self.scheduler_thread_exists.store(true, Ordering::SeqCst);
        let scheduler_id = self.scheduler_id.fetch_add(1, Ordering::SeqCst) + 1;

        let context = ThreadContext {
            queue: self.queue.clone(),
            progress: self.progress.clone(),
            sink: self.sink.clone(),
            settings: self.settings.clone(),
            running: self.running.clone(),
            scheduler_thread_exists: self.scheduler_thread_exists.clone(),
            scheduler_id_atomic: self.scheduler_id.clone(),
            in_flight: self.in_flight.clone(),
            stats: self.stats.clone(),
            buffer_capacity: self.buffer_capacity,
        };

        thread::spawn(move || run_scheduler_thread(context, scheduler_id))
    }

    /// Clear the running flag and wait for the scheduler loop to exit.
    pub(in crate::playback::player) fn halt_scheduler(&self) {
        let mut handle = self.scheduler_handle.lock().unwrap();
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = handle.take() {
            if handle.join().is_err() {
                error!("scheduler thread panicked");
                self.scheduler_thread_exists.store(false, Ordering::SeqCst);
            }
        }
    }
}
