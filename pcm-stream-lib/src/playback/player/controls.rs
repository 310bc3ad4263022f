//! Transport and lifecycle operations for `Player`.
//!
//! Methods here move the player through its lifecycle, feed the sample queue
//! and expose progress for completion waits and status displays.

use std::sync::atomic::Ordering;

use log::{info, warn};

use crate::audio::samples::decode_le_bytes;
use crate::error::PlayerError;
use crate::playback::progress::ProgressSnapshot;

use super::{Player, PlayerState, SchedulerStats};

impl Player {
    /// Start draining the queue into the sink.
    ///
    /// Starting an already running player is a no-op; at most one scheduler
    /// loop exists per player.
    pub fn start(&self) {
        if self.is_destroyed() {
            warn!("start ignored: player was destroyed");
            return;
        }

        let mut handle = self.scheduler_handle.lock().unwrap();
        if !self.scheduler_thread_exists.load(Ordering::SeqCst) {
            *handle = Some(self.spawn_scheduler());
        }
        drop(handle);

        self.sink.lock().unwrap().play();
        self.state.lock().unwrap().clone_from(&PlayerState::Playing);
        info!("playback started");
    }

    /// Stop the scheduler loop and halt the sink.
    ///
    /// Samples still queued stay queued, and buffers already handed to the
    /// sink stay there, so a later [`Player::start`] resumes at the exact
    /// position playback left off.
    pub fn stop(&self) {
        self.halt_scheduler();
        self.sink.lock().unwrap().pause();

        let mut state = self.state.lock().unwrap();
        if *state == PlayerState::Playing {
            *state = PlayerState::Stopped;
            info!("playback stopped");
        }
    }

    /// Queue samples for playback. Empty chunks are ignored.
    pub fn append(&self, samples: &[i16]) {
        if self.is_destroyed() {
            return;
        }
        self.queue.append(samples);
    }

    /// Queue a little-endian `i16` byte buffer.
    pub fn add_audio_data(&self, bytes: &[u8]) -> Result<(), PlayerError> {
        let samples = decode_le_bytes(bytes)?;
        self.append(&samples);
        Ok(())
    }

    /// Block until every submitted sample has been played.
    ///
    /// Returns [`PlayerError::Aborted`] if the player is destroyed while
    /// samples are still outstanding.
    pub fn wait_for_completion(&self) -> Result<(), PlayerError> {
        let poll = self.settings.lock().unwrap().completion_poll();
        self.progress.wait_for_completion(poll, &self.destroyed)
    }

    /// Tear the player down, discarding queued and in-flight audio.
    ///
    /// Idempotent. Completion waiters are released with an error.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.halt_scheduler();
        {
            let mut sink = self.sink.lock().unwrap();
            sink.pause();
            sink.clear();
        }
        let dropped = self.queue.clear();
        self.progress.notify();
        self.state
            .lock()
            .unwrap()
            .clone_from(&PlayerState::Uninitialized);
        info!("player destroyed, {} queued samples discarded", dropped);
    }

    pub fn state(&self) -> PlayerState {
        *self.state.lock().unwrap()
    }

    /// Return true if playback is currently active.
    pub fn is_playing(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// Return true once every submitted sample has been played.
    pub fn is_drained(&self) -> bool {
        self.progress.is_drained()
    }

    /// Samples waiting in the queue, not yet handed to the sink.
    pub fn queued_samples(&self) -> usize {
        self.queue.len()
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        let mut stats = *self.stats.lock().unwrap();
        stats.buffers_in_flight = self.in_flight.load(Ordering::SeqCst);
        stats
    }

    /// Debug helper returning scheduler alive flag, running flag and state.
    pub fn debug_scheduler_state(&self) -> (bool, bool, PlayerState) {
        (
            self.scheduler_thread_exists.load(Ordering::SeqCst),
            self.running.load(Ordering::SeqCst),
            self.state(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::player::PlayerSettings;
    use crate::playback::sink::NullSink;
    use std::time::Duration;

    fn null_player(sample_rate: u32) -> Player {
        Player::with_sink(
            sample_rate,
            1,
            PlayerSettings::default(),
            Box::new(NullSink::new()),
        )
        .unwrap()
    }

    #[test]
    fn new_player_is_ready_and_drained() {
        let player = null_player(24_000);
        assert_eq!(player.state(), PlayerState::Ready);
        assert_eq!(player.buffer_capacity(), 2_400);
        assert!(player.is_drained());
    }

    #[test]
    fn zero_rate_or_channels_rejected() {
        let settings = PlayerSettings::default();
        assert!(matches!(
            Player::with_sink(0, 1, settings, Box::new(NullSink::new())),
            Err(PlayerError::InvalidArguments(_))
        ));
        assert!(matches!(
            Player::with_sink(24_000, 0, settings, Box::new(NullSink::new())),
            Err(PlayerError::InvalidArguments(_))
        ));
    }

    #[test]
    fn stop_without_start_keeps_ready() {
        let player = null_player(8_000);
        player.stop();
        assert_eq!(player.state(), PlayerState::Ready);
    }

    #[test]
    fn start_and_stop_transitions() {
        let player = null_player(8_000);
        player.start();
        assert!(player.is_playing());
        player.start();
        let (alive, running, _) = player.debug_scheduler_state();
        assert!(alive);
        assert!(running);

        player.stop();
        assert_eq!(player.state(), PlayerState::Stopped);
        let (alive, running, _) = player.debug_scheduler_state();
        assert!(!alive);
        assert!(!running);
    }

    #[test]
    fn null_sink_drains_everything() {
        let player = null_player(8_000);
        player.append(&[1_000; 3_000]);
        player.start();
        player.wait_for_completion().unwrap();

        let progress = player.progress();
        assert_eq!(progress.submitted, 3_000);
        assert_eq!(progress.played, 3_000);
        assert_eq!(player.queued_samples(), 0);
        player.destroy();
    }

    #[test]
    fn odd_byte_count_is_rejected_without_queueing() {
        let player = null_player(8_000);
        assert!(player.add_audio_data(&[0, 1, 2]).is_err());
        assert_eq!(player.progress().submitted, 0);
        player.add_audio_data(&[0, 1, 2, 3]).unwrap();
        assert_eq!(player.queued_samples(), 2);
    }

    #[test]
    fn destroy_releases_waiters_and_ignores_appends() {
        let player = null_player(8_000);
        player.append(&[5; 100]);

        let waiter = player.clone();
        let handle = std::thread::spawn(move || waiter.wait_for_completion());
        std::thread::sleep(Duration::from_millis(30));
        player.destroy();

        assert_eq!(handle.join().unwrap(), Err(PlayerError::Aborted));
        assert_eq!(player.state(), PlayerState::Uninitialized);
        player.append(&[1, 2, 3]);
        assert_eq!(player.queued_samples(), 0);
        player.start();
        assert_eq!(player.state(), PlayerState::Uninitialized);
        player.destroy();
    }
}
