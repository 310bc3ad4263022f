//! High-level streaming player.

mod controls;
mod runtime;
mod settings;

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::info;

use crate::audio::buffer::buffer_capacity;
use crate::audio::queue::SampleQueue;
use crate::error::PlayerError;
use crate::playback::progress::PlaybackProgress;
use crate::playback::sink::{open_output_sink, OutputSink};

pub use settings::{DeviceFailurePolicy, PlayerSettings};

/// Lifecycle state of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerState {
    /// Torn down; every operation is a no-op.
    Uninitialized,
    /// Created, playback never started.
    Ready,
    Playing,
    Stopped,
}

/// Counters describing what the scheduling loop has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Cycles that submitted a buffer.
    pub fill_cycles: u64,
    /// Cycles that found the queue empty and backed off.
    pub idle_cycles: u64,
    pub frames_scheduled: u64,
    /// Frames in the most recent submitted buffer.
    pub last_buffer_frames: usize,
    /// Buffers submitted to the sink and not yet reported played.
    pub buffers_in_flight: usize,
}

/// Streaming player for mono 16-bit PCM.
///
/// `Player` owns the pending sample queue, the output sink and the scheduler
/// thread. Clones share the same underlying player; teardown is explicit via
/// [`Player::destroy`].
#[derive(Clone)]
pub struct Player {
    sample_rate: u32,
    channels: u16,
    buffer_capacity: usize,
    state: Arc<Mutex<PlayerState>>,
    queue: SampleQueue,
    progress: Arc<PlaybackProgress>,
    sink: Arc<Mutex<Box<dyn OutputSink>>>,
    settings: Arc<Mutex<PlayerSettings>>,
    running: Arc<AtomicBool>,
    destroyed: Arc<AtomicBool>,
    scheduler_thread_exists: Arc<AtomicBool>,
    scheduler_id: Arc<AtomicU64>,
    scheduler_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    in_flight: Arc<AtomicUsize>,
    stats: Arc<Mutex<SchedulerStats>>,
}

impl Player {
    /// Create a player on the default output device.
    ///
    /// Device failures follow `settings.device_failure`.
    pub fn new(sample_rate: u32, channels: u16, settings: PlayerSettings) -> Result<Self, PlayerError> {
        validate_format(sample_rate, channels)?;
        let sink = open_output_sink(sample_rate, &settings)?;
        Self::with_sink(sample_rate, channels, settings, sink)
    }

    /// Create a player that writes into the given sink.
    pub fn with_sink(
        sample_rate: u32,
        channels: u16,
        settings: PlayerSettings,
        mut sink: Box<dyn OutputSink>,
    ) -> Result<Self, PlayerError> {
        validate_format(sample_rate, channels)?;

        let settings = settings.sanitized();
        sink.set_volume(settings.volume);
        let progress = Arc::new(PlaybackProgress::new());
        let buffer_capacity = buffer_capacity(sample_rate);
        info!(
            "player ready: {} Hz, {} channel(s) requested, {} frames per buffer",
            sample_rate, channels, buffer_capacity
        );

        Ok(Self {
            sample_rate,
            channels,
            buffer_capacity,
            state: Arc::new(Mutex::new(PlayerState::Ready)),
            queue: SampleQueue::new(progress.clone()),
            progress,
            sink: Arc::new(Mutex::new(sink)),
            settings: Arc::new(Mutex::new(settings)),
            running: Arc::new(AtomicBool::new(false)),
            destroyed: Arc::new(AtomicBool::new(false)),
            scheduler_thread_exists: Arc::new(AtomicBool::new(false)),
            scheduler_id: Arc::new(AtomicU64::new(0)),
            scheduler_handle: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            stats: Arc::new(Mutex::new(SchedulerStats::default())),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count given at creation. Output is always mono.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Frames per playback buffer (`sample_rate / 10`).
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }
}

fn validate_format(sample_rate: u32, channels: u16) -> Result<(), PlayerError> {
    if sample_rate == 0 {
        return Err(PlayerError::InvalidArguments(
            "sample rate must be positive".to_string(),
        ));
    }
    if channels == 0 {
        return Err(PlayerError::InvalidArguments(
            "channel count must be at least 1".to_string(),
        ));
    }
    Ok(())
}
