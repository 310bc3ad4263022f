//! Helpers for converting between the host wire format and sink samples.

use crate::constants::SAMPLE_SCALE;
use crate::error::PlayerError;

/// Convert one `i16` sample into the sink's `f32` range.
///
/// The conversion divides by `32767`, so `i16::MIN` lands slightly below
/// `-1.0`. Values are not clamped.
///
/// # Example
/// ```rust
/// use pcm_stream_lib::audio::samples::convert_sample;
///
/// assert_eq!(convert_sample(32767), 1.0);
/// assert_eq!(convert_sample(0), 0.0);
/// ```
pub fn convert_sample(sample: i16) -> f32 {
    (sample as f64 / SAMPLE_SCALE) as f32
}

/// Convert a slice of `i16` samples, preserving order.
pub fn convert_samples(samples: &[i16]) -> Vec<f32> {
    samples.iter().copied().map(convert_sample).collect()
}

/// Decode a little-endian byte buffer into `i16` samples.
///
/// Each consecutive byte pair is one sample. An odd length is rejected
/// because the trailing byte cannot form a sample.
pub fn decode_le_bytes(bytes: &[u8]) -> Result<Vec<i16>, PlayerError> {
    if bytes.len() % 2 != 0 {
        return Err(PlayerError::InvalidArguments(format!(
            "audio data must hold whole 16-bit samples, got {} bytes",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode `i16` samples as little-endian bytes.
pub fn encode_le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}
