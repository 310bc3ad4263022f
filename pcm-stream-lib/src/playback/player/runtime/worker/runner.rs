//! Scheduler loop implementation.

use std::sync::atomic::Ordering;
use std::thread;

use log::debug;

use crate::audio::buffer::PlaybackBuffer;
use crate::playback::sink::PlayedCallback;

use super::context::ThreadContext;
use super::guard::SchedulerThreadGuard;

/// Run the scheduler loop for a single generation (`scheduler_id`).
///
/// Each cycle drains up to one buffer of samples, converts them and hands
/// the buffer to the sink. A cycle that finds the queue empty sleeps for the
/// idle backoff instead of spinning. The loop only exits once the running
/// flag is cleared or a newer generation replaces it.
///
/// # Arguments
///
/// * `ctx` - Captured shared state for this run.
/// * `scheduler_id` - Generation ID used to retire stale loops.
pub(in crate::playback::player::runtime) fn run_scheduler_thread(
    ctx: ThreadContext,
    scheduler_id: u64,
) {
    let _thread_guard = SchedulerThreadGuard::new(ctx.scheduler_thread_exists.clone());
    debug!("scheduler loop {} started", scheduler_id);

    loop {
        if !should_continue(&ctx, scheduler_id) {
            break;
        }
        if !wait_for_in_flight_capacity(&ctx, scheduler_id) {
            break;
        }

        let frames = fill_and_submit(&ctx);
        if frames == 0 {
            ctx.stats.lock().unwrap().idle_cycles += 1;
            let backoff = ctx.settings.lock().unwrap().idle_backoff();
            thread::sleep(backoff);
        }
    }

    debug!("scheduler loop {} finished", scheduler_id);
}

/// Return `false` once this loop has been stopped or superseded.
fn should_continue(ctx: &ThreadContext, scheduler_id: u64) -> bool {
    ctx.running.load(Ordering::SeqCst)
        && ctx.scheduler_id_atomic.load(Ordering::SeqCst) == scheduler_id
}

/// Block until the sink holds fewer buffers than the configured maximum.
///
/// # Returns
///
/// `true` if filling may proceed, `false` if the loop was stopped meanwhile.
fn wait_for_in_flight_capacity(ctx: &ThreadContext, scheduler_id: u64) -> bool {
    loop {
        let (max_in_flight, backoff) = {
            let settings = ctx.settings.lock().unwrap();
            (settings.max_in_flight_buffers, settings.idle_backoff())
        };
        if max_in_flight == 0 || ctx.in_flight.load(Ordering::SeqCst) < max_in_flight {
            return true;
        }
        if !should_continue(ctx, scheduler_id) {
            return false;
        }
        thread::sleep(backoff);
    }
}

/// Drain one buffer's worth of samples and submit it to the sink.
///
/// # Returns
///
/// Number of frames submitted; `0` when the queue was empty.
fn fill_and_submit(ctx: &ThreadContext) -> usize {
    let pending = ctx.queue.drain(ctx.buffer_capacity);
    if pending.is_empty() {
        return 0;
    }

    let mut buffer = PlaybackBuffer::with_capacity(ctx.buffer_capacity);
    let frames = buffer.fill(&pending);

    let progress = ctx.progress.clone();
    let in_flight = ctx.in_flight.clone();
    in_flight.fetch_add(1, Ordering::SeqCst);
    let on_played: PlayedCallback = Box::new(move || {
        in_flight.fetch_sub(1, Ordering::SeqCst);
        progress.record_played(frames as u64);
    });

    ctx.sink.lock().unwrap().submit(buffer, on_played);

    let mut stats = ctx.stats.lock().unwrap();
    stats.fill_cycles += 1;
    stats.frames_scheduled += frames as u64;
    stats.last_buffer_frames = frames;

    #[cfg(feature = "debug")]
    debug!(
        "scheduled buffer: frames={} in_flight={} queued={}",
        frames,
        ctx.in_flight.load(Ordering::SeqCst),
        ctx.queue.len()
    );

    frames
}
