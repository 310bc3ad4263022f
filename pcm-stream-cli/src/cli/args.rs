//! CLI argument definitions for `pcm-play`.

use clap::{Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("PCM Play")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stream 16-bit mono PCM to the default output device")
        .arg_required_else_help(true)
        .arg(
            Arg::new("sample-rate")
                .long("sample-rate")
                .short('r')
                .value_name("HZ")
                .default_value("24000")
                .global(true)
                .help("Sample rate of raw input or generated tones (WAV files use their header)"),
        )
        .arg(
            Arg::new("GAIN")
                .long("gain")
                .short('g')
                .value_name("GAIN")
                .default_value("100")
                .global(true)
                .help("The playback gain in percent"),
        )
        .arg(
            Arg::new("chunk-ms")
                .long("chunk-ms")
                .value_name("MS")
                .default_value("20")
                .global(true)
                .help("Size of each chunk handed to the player (ms of audio)"),
        )
        .arg(
            Arg::new("realtime")
                .long("realtime")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Pace chunk delivery at playback speed, like a live stream"),
        )
        .arg(
            Arg::new("max-in-flight")
                .long("max-in-flight")
                .value_name("BUFFERS")
                .default_value("0")
                .global(true)
                .help("Maximum buffers queued on the device at once (0 = unlimited)"),
        )
        .arg(
            Arg::new("idle-backoff-ms")
                .long("idle-backoff-ms")
                .value_name("MS")
                .default_value("10")
                .global(true)
                .help("Delay before re-checking an empty queue"),
        )
        .arg(
            Arg::new("no-device")
                .long("no-device")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Use a silent sink instead of the default output device"),
        )
        .arg(
            Arg::new("fail-on-device-error")
                .long("fail-on-device-error")
                .action(ArgAction::SetTrue)
                .global(true)
                .conflicts_with("no-device")
                .help("Exit with an error if the output device cannot be opened"),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print a JSON playback summary when finished"),
        )
        .arg(
            Arg::new("no-tui")
                .long("no-tui")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Skip the status screen and echo logs to stderr"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Suppress the status screen and log output"),
        )
        .arg(
            Arg::new("INPUT")
                .help("A .wav file, a raw s16le file, or - to read raw samples from stdin")
                .required(false)
                .index(1),
        )
        .subcommand(
            Command::new("tone")
                .about("Stream a generated sine tone")
                .arg(
                    Arg::new("frequency")
                        .long("frequency")
                        .short('f')
                        .value_name("HZ")
                        .default_value("440")
                        .help("Tone frequency"),
                )
                .arg(
                    Arg::new("seconds")
                        .long("seconds")
                        .short('s')
                        .value_name("SECONDS")
                        .default_value("2.0")
                        .help("Tone length"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_work_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["pcm-play", "tone", "--seconds", "0.5", "--no-device", "-q"])
            .unwrap();
        assert!(matches.get_flag("no-device"));
        assert!(matches.get_flag("quiet"));
        let (name, tone) = matches.subcommand().unwrap();
        assert_eq!(name, "tone");
        assert_eq!(tone.get_one::<String>("seconds").unwrap(), "0.5");
    }

    #[test]
    fn device_flags_conflict() {
        let result = build_cli().try_get_matches_from([
            "pcm-play",
            "input.raw",
            "--no-device",
            "--fail-on-device-error",
        ]);
        assert!(result.is_err());
    }
}
