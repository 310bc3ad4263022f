//! Fixed-capacity `f32` buffer handed to the output sink.

use super::samples::convert_sample;
use crate::constants::BUFFERS_PER_SECOND;

/// Playback buffer capacity for a sample rate: 100 ms of mono audio.
///
/// Never returns zero so that very low test rates still make progress.
pub fn buffer_capacity(sample_rate: u32) -> usize {
    ((sample_rate / BUFFERS_PER_SECOND) as usize).max(1)
}

/// A block of converted samples with a logical length up to its capacity.
///
/// A new buffer is built for every scheduling cycle and ownership moves into
/// the sink, so a buffer is never refilled while the device still reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackBuffer {
    frames: Vec<f32>,
    len: usize,
}

impl PlaybackBuffer {
    /// Allocate a zeroed buffer holding up to `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: vec![0.0; capacity],
            len: 0,
        }
    }

    /// Convert `samples` into the buffer and return the frames written.
    ///
    /// At most `capacity` samples are taken. Everything past the new logical
    /// length is zeroed so stale audio cannot leak into playback.
    pub fn fill(&mut self, samples: &[i16]) -> usize {
        let frames_to_copy = samples.len().min(self.frames.len());
        for (slot, sample) in self.frames.iter_mut().zip(&samples[..frames_to_copy]) {
            *slot = convert_sample(*sample);
        }
        for slot in &mut self.frames[frames_to_copy..] {
            *slot = 0.0;
        }
        self.len = frames_to_copy;
        frames_to_copy
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Frames inside the logical length.
    pub fn frames(&self) -> &[f32] {
        &self.frames[..self.len]
    }

    /// Consume the buffer, keeping only the logical frames.
    pub fn into_frames(mut self) -> Vec<f32> {
        self.frames.truncate(self.len);
        self.frames
    }
}
