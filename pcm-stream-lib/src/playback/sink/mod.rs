//! Output sinks that play scheduled buffers and report completion.
//!
//! - [`rodio_sink`] plays through the default output device.
//! - [`NullSink`] keeps the pipeline alive without a device.

mod rodio_sink;

use log::error;

use crate::audio::buffer::PlaybackBuffer;
use crate::error::PlayerError;
use crate::playback::player::{DeviceFailurePolicy, PlayerSettings};

pub use rodio_sink::RodioSink;

/// Callback fired exactly once when a submitted buffer has been played.
pub type PlayedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Destination for converted playback buffers.
///
/// Implementations queue buffers in submission order and invoke each
/// buffer's [`PlayedCallback`] once its last frame has been played.
pub trait OutputSink: Send {
    /// Start or resume audible output.
    fn play(&mut self);

    /// Halt output, keeping queued buffers for a later [`OutputSink::play`].
    fn pause(&mut self);

    /// Drop every queued buffer without firing its callback.
    fn clear(&mut self);

    fn set_volume(&mut self, volume: f32);

    /// Queue `buffer` for playback.
    fn submit(&mut self, buffer: PlaybackBuffer, on_played: PlayedCallback);
}

/// Sink used when no output device is available.
///
/// Buffers are accepted and reported as played straight away, so completion
/// waits still resolve while nothing is audible.
#[derive(Debug, Default)]
pub struct NullSink {
    playing: bool,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for NullSink {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn clear(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn submit(&mut self, _buffer: PlaybackBuffer, on_played: PlayedCallback) {
        on_played();
    }
}

/// Open the output sink for a new player, applying the device failure policy.
///
/// # Arguments
///
/// * `sample_rate` - Rate of the mono stream in Hz.
/// * `settings` - Player settings carrying volume and the failure policy.
pub fn open_output_sink(
    sample_rate: u32,
    settings: &PlayerSettings,
) -> Result<Box<dyn OutputSink>, PlayerError> {
    let opened = RodioSink::open(sample_rate, settings.volume)
        .map(|sink| Box::new(sink) as Box<dyn OutputSink>);
    apply_device_policy(opened, settings.device_failure)
}

/// Resolve the outcome of opening a device sink under `policy`.
///
/// `Degrade` swaps a failed open for a [`NullSink`]; `Fail` passes the error on.
pub fn apply_device_policy(
    opened: Result<Box<dyn OutputSink>, PlayerError>,
    policy: DeviceFailurePolicy,
) -> Result<Box<dyn OutputSink>, PlayerError> {
    match opened {
        Ok(sink) => Ok(sink),
        Err(err) => match policy {
            DeviceFailurePolicy::Fail => Err(err),
            DeviceFailurePolicy::Degrade => {
                error!("{}; continuing without audible output", err);
                Ok(Box::new(NullSink::new()))
            }
        },
    }
}
