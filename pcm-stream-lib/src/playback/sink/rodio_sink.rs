//! Output through the default device via `rodio`.

use rodio::source::SeekError;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info, warn};

use super::{OutputSink, PlayedCallback};
use crate::audio::buffer::PlaybackBuffer;
use crate::error::PlayerError;

const OUTPUT_STREAM_OPEN_RETRIES: usize = 5;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// Sink backed by a `rodio::Sink` on the default output stream.
///
/// The `OutputStream` is owned by a keeper thread for the lifetime of the
/// sink; dropping the sink releases the stream.
pub struct RodioSink {
    sink: Sink,
    sample_rate: u32,
    shutdown: Option<mpsc::Sender<()>>,
    keeper: Option<JoinHandle<()>>,
}

impl RodioSink {
    /// Open the default output device for a mono stream at `sample_rate`.
    ///
    /// The returned sink starts paused.
    pub fn open(sample_rate: u32, volume: f32) -> Result<Self, PlayerError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Sink, PlayerError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let keeper = thread::Builder::new()
            .name("pcm-stream-output".to_string())
            .spawn(move || {
                let stream = match open_output_stream_with_retry() {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let sink = Sink::connect_new(stream.mixer());
                if ready_tx.send(Ok(sink)).is_err() {
                    return;
                }
                // Blocks until the sink is dropped and the sender goes away.
                let _ = shutdown_rx.recv();
                drop(stream);
            })?;

        let sink = match ready_rx.recv() {
            Ok(Ok(sink)) => sink,
            Ok(Err(err)) => {
                let _ = keeper.join();
                return Err(err);
            }
            Err(_) => {
                let _ = keeper.join();
                return Err(PlayerError::Device(
                    "output thread exited before opening a stream".to_string(),
                ));
            }
        };

        sink.pause();
        sink.set_volume(volume);
        info!("opened output stream at {} Hz", sample_rate);

        Ok(Self {
            sink,
            sample_rate,
            shutdown: Some(shutdown_tx),
            keeper: Some(keeper),
        })
    }
}

impl OutputSink for RodioSink {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn clear(&mut self) {
        self.sink.clear();
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn submit(&mut self, buffer: PlaybackBuffer, on_played: PlayedCallback) {
        let source = CompletionSource::new(self.sample_rate, buffer.into_frames(), on_played);
        self.sink.append(source);
    }
}

impl Drop for RodioSink {
    fn drop(&mut self) {
        self.sink.stop();
        self.shutdown.take();
        if let Some(keeper) = self.keeper.take() {
            let _ = keeper.join();
        }
    }
}

/// Open the default output stream with bounded retry behavior.
fn open_output_stream_with_retry() -> Result<OutputStream, PlayerError> {
    let mut last_error = String::new();
    for attempt in 1..=OUTPUT_STREAM_OPEN_RETRIES {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                last_error = err.to_string();
                if attempt == OUTPUT_STREAM_OPEN_RETRIES {
                    error!(
                        "failed to open default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    break;
                }
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
            }
        }
    }
    Err(PlayerError::Device(last_error))
}

/// Mono source over one playback buffer that reports when it runs dry.
///
/// The callback fires when the mixer pulls the last frame, which is ahead of
/// the speaker by the device's output buffer (typically a few to tens of ms).
struct CompletionSource {
    frames: std::vec::IntoIter<f32>,
    sample_rate: u32,
    total_frames: usize,
    on_played: Option<PlayedCallback>,
}

impl CompletionSource {
    fn new(sample_rate: u32, frames: Vec<f32>, on_played: PlayedCallback) -> Self {
        Self {
            total_frames: frames.len(),
            frames: frames.into_iter(),
            sample_rate,
            on_played: Some(on_played),
        }
    }
}

impl Iterator for CompletionSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        match self.frames.next() {
            Some(frame) => Some(frame),
            None => {
                if let Some(on_played) = self.on_played.take() {
                    on_played();
                }
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}

impl Source for CompletionSource {
    fn current_span_len(&self) -> Option<usize> {
        Some(self.frames.len())
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.total_frames as f64 / self.sample_rate.max(1) as f64,
        ))
    }

    fn try_seek(&mut self, _pos: Duration) -> Result<(), SeekError> {
        Err(SeekError::NotSupported {
            underlying_source: "CompletionSource",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn completion_fires_once_after_last_frame() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut source = CompletionSource::new(
            24_000,
            vec![0.5, -0.5],
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(source.channels(), 1);
        assert_eq!(source.current_span_len(), Some(2));
        assert_eq!(source.next(), Some(0.5));
        assert_eq!(source.next(), Some(-0.5));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(source.next(), None);
        assert_eq!(source.next(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duration_follows_frame_count() {
        let source = CompletionSource::new(24_000, vec![0.0; 2_400], Box::new(|| {}));
        assert_eq!(source.total_duration(), Some(Duration::from_millis(100)));
    }
}
