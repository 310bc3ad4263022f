//! Loading PCM input for streaming.

use std::f32::consts::PI;
use std::fs;
use std::io::Read;
use std::path::Path;

use log::info;
use pcm_stream_lib::audio::samples::decode_le_bytes;

use crate::error::CliError;

const TONE_AMPLITUDE: f32 = 0.5;

/// Mono samples and the rate they were recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmInput {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

/// Load `path` as WAV (by extension), stdin (`-`) or a raw s16le file.
///
/// `raw_sample_rate` applies to raw input only.
pub fn load_input(path: &str, raw_sample_rate: u32) -> Result<PcmInput, CliError> {
    if path == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        return raw_input(&bytes, raw_sample_rate);
    }

    let is_wav = Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if is_wav {
        return load_wav(path);
    }

    let bytes = fs::read(path)?;
    raw_input(&bytes, raw_sample_rate)
}

fn raw_input(bytes: &[u8], sample_rate: u32) -> Result<PcmInput, CliError> {
    let samples = decode_le_bytes(bytes)?;
    info!("read {} raw samples at {} Hz", samples.len(), sample_rate);
    Ok(PcmInput {
        sample_rate,
        samples,
    })
}

fn load_wav(path: &str) -> Result<PcmInput, CliError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(CliError::InvalidInput(format!(
            "{} has {} channels, only mono input can be streamed",
            path, spec.channels
        )));
    }
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(CliError::InvalidInput(format!(
            "{} is not 16-bit integer PCM",
            path
        )));
    }

    let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    info!(
        "read {} samples from {} at {} Hz",
        samples.len(),
        path,
        spec.sample_rate
    );
    Ok(PcmInput {
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Generate a sine tone at half scale.
pub fn generate_tone(frequency: f32, seconds: f32, sample_rate: u32) -> PcmInput {
    let total = (seconds.max(0.0) * sample_rate as f32).round() as usize;
    let step = 2.0 * PI * frequency / sample_rate.max(1) as f32;
    let samples = (0..total)
        .map(|n| ((n as f32 * step).sin() * TONE_AMPLITUDE * i16::MAX as f32) as i16)
        .collect();

    PcmInput {
        sample_rate,
        samples,
    }
}
