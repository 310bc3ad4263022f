//! # PCM Stream Library
//!
//! Streaming playback of mono 16-bit PCM. Producers push little-endian sample
//! chunks, a scheduler thread drains them in 100 ms buffers, converts them to
//! `f32` and feeds an output sink. Completion tracking tells callers when every
//! submitted sample has been heard.

pub mod audio;
pub mod bridge;
pub mod constants;
pub mod error;
pub mod playback;
