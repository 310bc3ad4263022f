#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use pcm_stream_lib::audio::buffer::PlaybackBuffer;
use pcm_stream_lib::playback::sink::{OutputSink, PlayedCallback};

#[derive(Default)]
struct ManualSinkState {
    submitted: Vec<Vec<f32>>,
    pending: VecDeque<PlayedCallback>,
    playing: bool,
    auto_complete: bool,
    volume: f32,
    clears: usize,
}

/// Scripted sink: records every buffer and lets the test decide when each
/// one finishes playing. Clones share state.
#[derive(Clone, Default)]
pub struct ManualSink {
    state: Arc<Mutex<ManualSinkState>>,
}

impl ManualSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that reports every buffer played as soon as it is submitted.
    pub fn auto_completing() -> Self {
        let sink = Self::default();
        sink.state.lock().unwrap().auto_complete = true;
        sink
    }

    pub fn boxed(&self) -> Box<dyn OutputSink> {
        Box::new(self.clone())
    }

    pub fn submitted(&self) -> Vec<Vec<f32>> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn submitted_count(&self) -> usize {
        self.state.lock().unwrap().submitted.len()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }

    /// Report the oldest pending buffer as played.
    pub fn complete_next(&self) -> bool {
        let callback = self.state.lock().unwrap().pending.pop_front();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn complete_all(&self) -> usize {
        let mut completed = 0;
        while self.complete_next() {
            completed += 1;
        }
        completed
    }

    /// Poll until at least `count` buffers have been submitted.
    pub fn wait_for_submitted(&self, count: usize, timeout: Duration) -> bool {
        wait_until(timeout, || self.submitted_count() >= count)
    }
}

impl OutputSink for ManualSink {
    fn play(&mut self) {
        self.state.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn clear(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.pending.clear();
        state.clears += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn submit(&mut self, buffer: PlaybackBuffer, on_played: PlayedCallback) {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(buffer.into_frames());
        if state.auto_complete {
            drop(state);
            on_played();
        } else {
            state.pending.push_back(on_played);
        }
    }
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
