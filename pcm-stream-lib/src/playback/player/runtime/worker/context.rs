//! Shared state captured when a scheduler thread is spawned.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize};
use std::sync::{Arc, Mutex};

use crate::audio::queue::SampleQueue;
use crate::playback::progress::PlaybackProgress;
use crate::playback::sink::OutputSink;

use super::super::super::{PlayerSettings, SchedulerStats};

/// Captured shared state passed from `Player::spawn_scheduler` into the
/// scheduler thread.
pub(in crate::playback::player::runtime) struct ThreadContext {
    pub(in crate::playback::player::runtime) queue: SampleQueue,
    pub(in crate::playback::player::runtime) progress: Arc<PlaybackProgress>,
    pub(in crate::playback::player::runtime) sink: Arc<Mutex<Box<dyn OutputSink>>>,
    pub(in crate::playback::player::runtime) settings: Arc<Mutex<PlayerSettings>>,
    pub(in crate::playback::player::runtime) running: Arc<AtomicBool>,
    pub(in crate::playback::player::runtime) scheduler_thread_exists: Arc<AtomicBool>,
    pub(in crate::playback::player::runtime) scheduler_id_atomic: Arc<AtomicU64>,
    pub(in crate::playback::player::runtime) in_flight: Arc<AtomicUsize>,
    pub(in crate::playback::player::runtime) stats: Arc<Mutex<SchedulerStats>>,
    pub(in crate::playback::player::runtime) buffer_capacity: usize,
}
