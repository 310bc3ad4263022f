//! # PCM Play
//!
//! A command-line streamer for 16-bit mono PCM: WAV files, raw
//! little-endian sample files, stdin or a generated tone.

use log::error;

mod cli;
mod controls;
mod error;
mod logging;
mod runner;
mod ui;

fn main() {
    let args = cli::args::build_cli().get_matches();
    let quiet = args.get_flag("quiet");
    let log_buffer = logging::init(!quiet && args.get_flag("no-tui"));

    let code = match runner::run(&args, log_buffer) {
        Ok(code) => code,
        Err(err) => {
            let message = err.to_string().to_lowercase();
            error!("{}", message);
            if !quiet && !logging::echoing() {
                eprintln!("error: {}", message);
            }
            -1
        }
    };

    std::process::exit(code)
}
