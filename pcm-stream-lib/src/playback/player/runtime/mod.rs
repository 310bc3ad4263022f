//! Internal runtime plumbing for the `Player` scheduler thread.
//!
//! - [`thread`] handles spawning, stopping and shared state capture.
//! - [`worker`] runs the drain/convert/submit loop.

mod thread;
mod worker;
