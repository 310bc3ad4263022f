//! Shared constants for buffering and scheduling defaults.

/// Number of playback buffers per second of audio.
///
/// The buffer capacity is `sample_rate / BUFFERS_PER_SECOND`, i.e. 100 ms.
pub const BUFFERS_PER_SECOND: u32 = 10;

/// Divisor used to normalize `i16` samples into `f32`.
pub const SAMPLE_SCALE: f64 = 32767.0;

/// Delay before re-checking an empty queue (ms).
pub const DEFAULT_IDLE_BACKOFF_MS: u64 = 10;

/// Bounded wait between completion checks (ms).
pub const DEFAULT_COMPLETION_POLL_MS: u64 = 10;

/// Sample rate used by front ends when none is given (Hz).
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
