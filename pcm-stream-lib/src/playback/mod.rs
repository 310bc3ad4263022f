//! Playback pipeline: progress tracking, output sinks and the player that
//! drives the scheduling loop.

pub mod player;
pub mod progress;
pub mod sink;
