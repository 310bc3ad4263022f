//! Host-facing surface of the player.
//!
//! [`StreamingAudioPlugin`] exposes the six operations a host runtime calls
//! (`initializeAudioPlayer`, `destroyAudioPlayer`, `startPlayback`,
//! `stopPlayback`, `addAudioData`, `streamComplete`) with the argument
//! shapes the host sends. [`method`] adds a JSON method-call dispatcher on top.

pub mod method;

use std::sync::Mutex;

use log::{info, warn};

use crate::error::PlayerError;
use crate::playback::player::{Player, PlayerSettings, PlayerState, SchedulerStats};
use crate::playback::progress::ProgressSnapshot;
use crate::playback::sink::{open_output_sink, OutputSink};

pub use method::{MethodError, MethodResult};

/// Builds the output sink for a newly initialized player.
pub type SinkFactory =
    Box<dyn Fn(u32, &PlayerSettings) -> Result<Box<dyn OutputSink>, PlayerError> + Send + Sync>;

/// Whether a player currently exists.
#[derive(Clone, Default)]
pub enum PlayerSlot {
    #[default]
    NotInitialized,
    Initialized(Player),
}

impl PlayerSlot {
    pub fn player(&self) -> Option<&Player> {
        match self {
            Self::NotInitialized => None,
            Self::Initialized(player) => Some(player),
        }
    }
}

/// Owner of at most one [`Player`] at a time.
///
/// All methods take `&self`; a blocking `stream_complete` does not hold the
/// slot lock, so producers can keep calling `add_audio_data` meanwhile.
pub struct StreamingAudioPlugin {
    slot: Mutex<PlayerSlot>,
    settings: PlayerSettings,
    sink_factory: SinkFactory,
}

impl StreamingAudioPlugin {
    /// Plugin that plays through the default output device.
    pub fn new(settings: PlayerSettings) -> Self {
        Self::with_sink_factory(settings, Box::new(open_output_sink))
    }

    /// Plugin whose players write into sinks built by `sink_factory`.
    pub fn with_sink_factory(settings: PlayerSettings, sink_factory: SinkFactory) -> Self {
        Self {
            slot: Mutex::new(PlayerSlot::NotInitialized),
            settings,
            sink_factory,
        }
    }

    /// Create the player.
    ///
    /// Fails with [`PlayerError::InvalidArguments`] if a player already exists
    /// (the existing one is kept) or if the format is unusable. The sample
    /// rate is truncated to whole Hz.
    pub fn initialize_audio_player(&self, sample_rate: f64, channels: i64) -> Result<(), PlayerError> {
        let mut slot = self.slot.lock().unwrap();
        if slot.player().is_some() {
            return Err(PlayerError::InvalidArguments(
                "An AudioPlayer instance already exists, call destroyAudioPlayer".to_string(),
            ));
        }

        let sample_rate = parse_sample_rate(sample_rate)?;
        let channels = parse_channels(channels)?;
        let sink = (self.sink_factory)(sample_rate, &self.settings)?;
        let player = Player::with_sink(sample_rate, channels, self.settings, sink)?;
        *slot = PlayerSlot::Initialized(player);
        Ok(())
    }

    /// Tear down the player if one exists. Idempotent.
    pub fn destroy_audio_player(&self) {
        let previous = std::mem::take(&mut *self.slot.lock().unwrap());
        if let PlayerSlot::Initialized(player) = previous {
            player.destroy();
        }
    }

    /// Start playback; silently does nothing without a player.
    pub fn start_playback(&self) {
        if let Some(player) = self.current_player() {
            player.start();
        }
    }

    /// Stop playback; silently does nothing without a player.
    pub fn stop_playback(&self) {
        if let Some(player) = self.current_player() {
            player.stop();
        }
    }

    /// Queue little-endian `i16` bytes.
    ///
    /// Odd byte counts are rejected. Without a player the data is dropped.
    pub fn add_audio_data(&self, audio_data: &[u8]) -> Result<(), PlayerError> {
        match self.current_player() {
            Some(player) => player.add_audio_data(audio_data),
            None => {
                warn!("addAudioData without a player, {} bytes dropped", audio_data.len());
                Ok(())
            }
        }
    }

    /// Block until every submitted sample has been played.
    pub fn stream_complete(&self) -> Result<(), PlayerError> {
        let player = self
            .current_player()
            .ok_or_else(|| PlayerError::InvalidState("No audio player available".to_string()))?;
        player.wait_for_completion()?;
        info!("stream complete: {:?}", player.progress());
        Ok(())
    }

    pub fn player_state(&self) -> PlayerState {
        self.current_player()
            .map(|player| player.state())
            .unwrap_or(PlayerState::Uninitialized)
    }

    pub fn progress(&self) -> Option<ProgressSnapshot> {
        self.current_player().map(|player| player.progress())
    }

    pub fn scheduler_stats(&self) -> Option<SchedulerStats> {
        self.current_player().map(|player| player.scheduler_stats())
    }

    pub fn queued_samples(&self) -> Option<usize> {
        self.current_player().map(|player| player.queued_samples())
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.current_player().map(|player| player.sample_rate())
    }

    /// Clone of the current player handle, taken without holding the slot.
    pub fn current_player(&self) -> Option<Player> {
        self.slot.lock().unwrap().player().cloned()
    }
}

impl Drop for StreamingAudioPlugin {
    fn drop(&mut self) {
        self.destroy_audio_player();
    }
}

fn parse_sample_rate(sample_rate: f64) -> Result<u32, PlayerError> {
    if !sample_rate.is_finite() || sample_rate < 1.0 || sample_rate > u32::MAX as f64 {
        return Err(PlayerError::InvalidArguments(format!(
            "sample rate {} is out of range",
            sample_rate
        )));
    }
    Ok(sample_rate.trunc() as u32)
}

fn parse_channels(channels: i64) -> Result<u16, PlayerError> {
    u16::try_from(channels)
        .ok()
        .filter(|channels| *channels >= 1)
        .ok_or_else(|| {
            PlayerError::InvalidArguments(format!("channel count {} is out of range", channels))
        })
}
