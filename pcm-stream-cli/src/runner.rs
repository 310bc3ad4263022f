use std::{
    io,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, sleep, JoinHandle},
    time::Duration,
};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use pcm_stream_lib::audio::samples::encode_le_bytes;
use pcm_stream_lib::bridge::StreamingAudioPlugin;
use pcm_stream_lib::error::PlayerError;
use pcm_stream_lib::playback::player::{DeviceFailurePolicy, PlayerSettings, PlayerState};
use pcm_stream_lib::playback::sink::{NullSink, OutputSink};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;

use crate::cli::input::{self, PcmInput};
use crate::error::CliError;
use crate::logging::LogBuffer;
use crate::{controls, logging, ui};

/// Totals printed by `--summary`.
#[derive(Debug, Serialize)]
struct RunSummary {
    sample_rate: u32,
    samples_submitted: u64,
    samples_played: u64,
    fill_cycles: u64,
    idle_cycles: u64,
    frames_scheduled: u64,
    completed: bool,
}

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, CliError> {
    info!("Starting PCM Play");

    // Global options may appear after the subcommand name.
    let (title, options, pcm) = match args.subcommand() {
        Some(("tone", tone)) => {
            let sample_rate: u32 = parse_arg(tone, "sample-rate")?;
            let frequency: f32 = parse_arg(tone, "frequency")?;
            let seconds: f32 = parse_arg(tone, "seconds")?;
            if !(seconds.is_finite() && seconds >= 0.0) {
                return Err(CliError::InvalidInput(format!(
                    "tone length must be a non-negative number of seconds, got {}",
                    seconds
                )));
            }
            let pcm = input::generate_tone(frequency, seconds, sample_rate);
            (format!("Tone {} Hz", frequency), tone, pcm)
        }
        _ => {
            let path = args.get_one::<String>("INPUT").ok_or_else(|| {
                CliError::InvalidInput("no input given; pass a file, - or the tone subcommand".into())
            })?;
            let sample_rate: u32 = parse_arg(args, "sample-rate")?;
            let pcm = input::load_input(path, sample_rate)?;
            (path.clone(), args, pcm)
        }
    };

    let quiet = options.get_flag("quiet");
    let show_tui = !quiet && !options.get_flag("no-tui");
    let settings = settings_from_args(options)?;
    let chunk_ms: u64 = parse_arg(options, "chunk-ms")?;
    let realtime = options.get_flag("realtime");

    let plugin = Arc::new(if options.get_flag("no-device") {
        StreamingAudioPlugin::with_sink_factory(
            settings,
            Box::new(
                |_: u32, _: &PlayerSettings| -> Result<Box<dyn OutputSink>, PlayerError> {
                    Ok(Box::new(NullSink::new()))
                },
            ),
        )
    } else {
        StreamingAudioPlugin::new(settings)
    });

    plugin.initialize_audio_player(pcm.sample_rate as f64, 1)?;
    plugin.start_playback();
    info!(
        "Streaming {} samples at {} Hz",
        pcm.samples.len(),
        pcm.sample_rate
    );

    let quit = Arc::new(AtomicBool::new(false));
    let producer_done = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));
    let sample_rate = pcm.sample_rate;

    let producer = spawn_producer(
        plugin.clone(),
        pcm,
        chunk_ms,
        realtime,
        quit.clone(),
        producer_done.clone(),
    )?;
    let completion = spawn_completion(plugin.clone(), producer, finished.clone())?;

    if show_tui {
        run_status_screen(&plugin, &title, &log_buffer, &producer_done, &finished, &quit);
    }

    let completed = match completion.join() {
        Ok(result) => result?,
        Err(_) => {
            return Err(CliError::InvalidInput(
                "stream completion thread panicked".into(),
            ))
        }
    };

    let progress = plugin.progress().unwrap_or_default();
    let stats = plugin.scheduler_stats().unwrap_or_default();
    plugin.destroy_audio_player();

    if completed {
        info!("Playback complete: {} samples played", progress.played);
    } else {
        warn!(
            "Playback stopped early: {} of {} samples played",
            progress.played, progress.submitted
        );
    }

    if options.get_flag("summary") {
        let summary = RunSummary {
            sample_rate,
            samples_submitted: progress.submitted,
            samples_played: progress.played,
            fill_cycles: stats.fill_cycles,
            idle_cycles: stats.idle_cycles,
            frames_scheduled: stats.frames_scheduled,
            completed,
        };
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|err| CliError::InvalidInput(err.to_string()))?;
        println!("{}", json);
    }

    Ok(0)
}

fn parse_arg<T: FromStr>(args: &ArgMatches, name: &str) -> Result<T, CliError> {
    let raw = args
        .get_one::<String>(name)
        .ok_or_else(|| CliError::InvalidInput(format!("missing --{}", name)))?;
    raw.parse::<T>()
        .map_err(|_| CliError::InvalidInput(format!("invalid value for --{}: {}", name, raw)))
}

fn settings_from_args(args: &ArgMatches) -> Result<PlayerSettings, CliError> {
    let gain: f32 = parse_arg(args, "GAIN")?;
    let device_failure = if args.get_flag("fail-on-device-error") {
        DeviceFailurePolicy::Fail
    } else {
        DeviceFailurePolicy::Degrade
    };

    Ok(PlayerSettings {
        idle_backoff_ms: parse_arg(args, "idle-backoff-ms")?,
        max_in_flight_buffers: parse_arg(args, "max-in-flight")?,
        volume: gain / 100.0,
        device_failure,
        ..PlayerSettings::default()
    }
    .sanitized())
}

/// Feed the input to the plugin in `chunk_ms` slices, as a network stream would.
fn spawn_producer(
    plugin: Arc<StreamingAudioPlugin>,
    pcm: PcmInput,
    chunk_ms: u64,
    realtime: bool,
    quit: Arc<AtomicBool>,
    producer_done: Arc<AtomicBool>,
) -> io::Result<JoinHandle<Result<(), PlayerError>>> {
    thread::Builder::new()
        .name("pcm-play-producer".into())
        .spawn(move || {
            let result = feed_chunks(&plugin, &pcm, chunk_ms, realtime, &quit);
            producer_done.store(true, Ordering::SeqCst);
            result
        })
}

fn feed_chunks(
    plugin: &StreamingAudioPlugin,
    pcm: &PcmInput,
    chunk_ms: u64,
    realtime: bool,
    quit: &AtomicBool,
) -> Result<(), PlayerError> {
    let chunk_len = ((pcm.sample_rate as u64 * chunk_ms) / 1000).max(1) as usize;
    for chunk in pcm.samples.chunks(chunk_len) {
        if quit.load(Ordering::SeqCst) {
            break;
        }
        plugin.add_audio_data(&encode_le_bytes(chunk))?;
        if realtime {
            sleep(Duration::from_millis(chunk_ms));
        }
    }
    Ok(())
}

/// Wait for the producer, then block in `stream_complete` until playback drains.
///
/// Resolves to `false` when the player was torn down before draining.
fn spawn_completion(
    plugin: Arc<StreamingAudioPlugin>,
    producer: JoinHandle<Result<(), PlayerError>>,
    finished: Arc<AtomicBool>,
) -> io::Result<JoinHandle<Result<bool, CliError>>> {
    thread::Builder::new()
        .name("pcm-play-completion".into())
        .spawn(move || {
            let produced = match producer.join() {
                Ok(result) => result.map_err(CliError::from),
                Err(_) => Err(CliError::InvalidInput("producer thread panicked".into())),
            };
            let outcome = produced.and_then(|_| match plugin.stream_complete() {
                Ok(()) => Ok(true),
                Err(PlayerError::Aborted) => Ok(false),
                Err(PlayerError::InvalidState(_)) => Ok(false),
                Err(err) => Err(CliError::from(err)),
            });
            finished.store(true, Ordering::SeqCst);
            outcome
        })
}

fn run_status_screen(
    plugin: &StreamingAudioPlugin,
    title: &str,
    log_buffer: &LogBuffer,
    producer_done: &AtomicBool,
    finished: &AtomicBool,
    quit: &AtomicBool,
) {
    let _raw_mode = RawModeGuard::enable().ok();
    let mut terminal = {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).ok()
    };

    while !finished.load(Ordering::SeqCst) {
        if let Some(term) = terminal.as_mut() {
            let progress = plugin.progress().unwrap_or_default();
            let stats = plugin.scheduler_stats().unwrap_or_default();
            let status = controls::status_text(controls::StatusArgs {
                state: plugin.player_state(),
                sample_rate: plugin.sample_rate().unwrap_or(0),
                submitted: progress.submitted,
                played: progress.played,
                queued: plugin.queued_samples().unwrap_or(0),
                producer_done: producer_done.load(Ordering::SeqCst),
                fill_cycles: stats.fill_cycles,
                idle_cycles: stats.idle_cycles,
                buffers_in_flight: stats.buffers_in_flight,
                max_in_flight: plugin
                    .current_player()
                    .map(|player| player.settings().max_in_flight_buffers)
                    .unwrap_or(0),
            });
            let log_lines = logging::snapshot(log_buffer);
            ui::draw_status(term, title, &status, &log_lines);
        }

        if !controls::handle_key_event(plugin) {
            quit.store(true, Ordering::SeqCst);
            // Unblocks stream_complete with an abort.
            if let Some(player) = plugin.current_player() {
                player.destroy();
            }
            break;
        }

        if plugin.player_state() == PlayerState::Uninitialized {
            break;
        }

        sleep(Duration::from_millis(50));
    }

    // Restore the terminal state before exiting.
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
