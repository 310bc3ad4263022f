//! Sample-level building blocks: format conversion, the pending sample queue
//! and the fixed-size playback buffer.

pub mod buffer;
pub mod queue;
pub mod samples;
