//! Shared FIFO of pending `i16` samples.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::playback::progress::PlaybackProgress;

/// Unbounded, thread-safe queue of samples waiting to be scheduled.
///
/// Producers append at the tail and the scheduler drains from the head;
/// samples are never reordered. Appends also advance the submitted counter of
/// the attached [`PlaybackProgress`] inside the same critical section, so the
/// queue length and the counter can never disagree.
#[derive(Clone)]
pub struct SampleQueue {
    pending: Arc<Mutex<VecDeque<i16>>>,
    progress: Arc<PlaybackProgress>,
}

impl SampleQueue {
    pub fn new(progress: Arc<PlaybackProgress>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(VecDeque::new())),
            progress,
        }
    }

    /// Append samples to the tail. Empty input is ignored.
    pub fn append(&self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }

        let mut pending = self.pending.lock().unwrap();
        pending.extend(samples.iter().copied());
        self.progress.record_submitted(samples.len() as u64);
    }

    /// Remove and return up to `max_count` samples from the head.
    pub fn drain(&self, max_count: usize) -> Vec<i16> {
        let mut pending = self.pending.lock().unwrap();
        let count = pending.len().min(max_count);
        pending.drain(..count).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().unwrap().is_empty()
    }

    /// Discard every pending sample and return how many were dropped.
    ///
    /// Dropped samples are taken back out of the submitted count.
    pub fn clear(&self) -> usize {
        let mut pending = self.pending.lock().unwrap();
        let dropped = pending.len();
        pending.clear();
        self.progress.record_discarded(dropped as u64);
        dropped
    }

    pub fn progress(&self) -> &Arc<PlaybackProgress> {
        &self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn queue() -> SampleQueue {
        SampleQueue::new(Arc::new(PlaybackProgress::new()))
    }

    #[test]
    fn drain_on_empty_queue_is_empty() {
        let queue = queue();
        assert!(queue.drain(16).is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn append_ignores_empty_chunks() {
        let queue = queue();
        queue.append(&[]);
        assert_eq!(queue.progress().snapshot().submitted, 0);
    }

    #[test]
    fn drain_is_fifo_and_partial() {
        let queue = queue();
        queue.append(&[1, 2, 3]);
        queue.append(&[4, 5]);
        assert_eq!(queue.progress().snapshot().submitted, 5);

        assert_eq!(queue.drain(2), vec![1, 2]);
        assert_eq!(queue.drain(10), vec![3, 4, 5]);
        assert!(queue.drain(10).is_empty());
    }

    #[test]
    fn clear_reports_dropped_samples() {
        let queue = queue();
        queue.append(&[7; 12]);
        queue.drain(2);
        assert_eq!(queue.clear(), 10);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.progress().snapshot().submitted, 2);
    }

    #[test]
    fn concurrent_append_and_drain_keep_order() {
        let queue = queue();
        let producer_queue = queue.clone();
        let producer = thread::spawn(move || {
            for chunk in 0..200_i16 {
                let base = chunk * 10;
                let samples: Vec<i16> = (base..base + 10).collect();
                producer_queue.append(&samples);
            }
        });

        let mut drained = Vec::new();
        while drained.len() < 2_000 {
            drained.extend(queue.drain(37));
            thread::yield_now();
        }
        producer.join().unwrap();

        let expected: Vec<i16> = (0..2_000).collect();
        assert_eq!(drained, expected);
        assert_eq!(queue.progress().snapshot().submitted, 2_000);
    }
}
