//! Scheduler worker internals.
//!
//! - [`context`] defines captured shared thread state.
//! - [`guard`] tracks scheduler-thread liveness.
//! - [`runner`] executes the drain/convert/submit loop.

mod context;
mod guard;
mod runner;

pub(in crate::playback::player::runtime) use context::ThreadContext;
pub(in crate::playback::player::runtime) use runner::run_scheduler_thread;
