use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use pcm_stream_lib::bridge::StreamingAudioPlugin;
use pcm_stream_lib::playback::player::PlayerState;

/// What the status screen shows for one frame.
pub struct StatusSnapshot {
    pub headline: String,
    pub ratio: f64,
    pub gauge_label: String,
    pub details: Vec<String>,
}

pub struct StatusArgs {
    pub state: PlayerState,
    pub sample_rate: u32,
    pub submitted: u64,
    pub played: u64,
    pub queued: usize,
    pub producer_done: bool,
    pub fill_cycles: u64,
    pub idle_cycles: u64,
    pub buffers_in_flight: usize,
    pub max_in_flight: usize,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let state = match args.state {
        PlayerState::Playing => "playing",
        PlayerState::Stopped => "stopped",
        PlayerState::Ready => "ready",
        PlayerState::Uninitialized => "closed",
    };
    let producer = if args.producer_done {
        "input finished"
    } else {
        "receiving input"
    };

    let rate = args.sample_rate.max(1) as f64;
    let ratio = if args.submitted > 0 {
        (args.played as f64 / args.submitted as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge_label = format!(
        "{} / {}",
        format_time(args.played as f64 / rate * 1000.0),
        format_time(args.submitted as f64 / rate * 1000.0)
    );

    let limit = match args.max_in_flight {
        0 => "unlimited".to_string(),
        n => n.to_string(),
    };
    let details = vec![
        format!("queued     {} samples", args.queued),
        format!("in flight  {} buffers (limit {})", args.buffers_in_flight, limit),
        format!(
            "cycles     {} filled / {} idle",
            args.fill_cycles, args.idle_cycles
        ),
    ];

    StatusSnapshot {
        headline: format!("{} | {} | {} Hz", state, producer, args.sample_rate),
        ratio,
        gauge_label,
        details,
    }
}

/// Poll for one key press and apply it.
///
/// Returns `false` when the user asked to quit.
pub fn handle_key_event(plugin: &StreamingAudioPlugin) -> bool {
    if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
        return true;
    }
    let key = match event::read() {
        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
        _ => return true,
    };

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            plugin.stop_playback();
            return false;
        }
        KeyCode::Char(' ') => {
            if plugin.player_state() == PlayerState::Playing {
                plugin.stop_playback();
            } else {
                plugin.start_playback();
            }
        }
        KeyCode::Char('+') | KeyCode::Char(']') => adjust_in_flight(plugin, 1),
        KeyCode::Char('-') | KeyCode::Char('[') => adjust_in_flight(plugin, -1),
        _ => {}
    }

    true
}

/// Step the in-flight buffer limit; stepping below 1 lifts the limit.
fn adjust_in_flight(plugin: &StreamingAudioPlugin, step: i64) {
    if let Some(player) = plugin.current_player() {
        let current = player.settings().max_in_flight_buffers;
        let next = step_limit(current, step);
        player.set_max_in_flight_buffers(next);
        log::info!("max in-flight buffers: {}", next);
    }
}

fn step_limit(current: usize, step: i64) -> usize {
    (current as i64 + step).clamp(0, 64) as usize
}

fn format_time(time: f64) -> String {
    let tenths = (time / 100.0).floor() as u64;
    let seconds = tenths / 10;
    let minutes = seconds / 60;
    format!("{:02}:{:02}.{}", minutes, seconds % 60, tenths % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_shows_tenths() {
        assert_eq!(format_time(0.0), "00:00.0");
        assert_eq!(format_time(61_250.0), "01:01.2");
    }

    #[test]
    fn status_reports_progress() {
        let status = status_text(StatusArgs {
            state: PlayerState::Playing,
            sample_rate: 24_000,
            submitted: 48_000,
            played: 24_000,
            queued: 2_400,
            producer_done: false,
            fill_cycles: 9,
            idle_cycles: 3,
            buffers_in_flight: 2,
            max_in_flight: 0,
        });
        assert_eq!(status.gauge_label, "00:01.0 / 00:02.0");
        assert_eq!(status.ratio, 0.5);
        assert!(status.headline.starts_with("playing"));
        assert!(status.details[0].contains("2400 samples"));
        assert!(status.details[1].contains("limit unlimited"));
    }

    #[test]
    fn in_flight_limit_steps_within_bounds() {
        assert_eq!(step_limit(0, 1), 1);
        assert_eq!(step_limit(1, -1), 0);
        assert_eq!(step_limit(0, -1), 0);
        assert_eq!(step_limit(64, 1), 64);
    }
}
