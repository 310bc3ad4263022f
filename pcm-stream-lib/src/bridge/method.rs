//! JSON method-call dispatch for host runtimes.
//!
//! Mirrors a platform method channel: a method name plus a JSON argument
//! map in, a JSON value or a coded error out.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

use log::debug;

use super::StreamingAudioPlugin;
use crate::error::PlayerError;

pub const INVALID_ARGUMENTS: &str = "INVALID_ARGUMENTS";
pub const INVALID_STATE: &str = "INVALID_STATE";
pub const DEVICE_ERROR: &str = "DEVICE_ERROR";
pub const ABORTED: &str = "ABORTED";

/// Coded error returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodError {
    pub code: &'static str,
    pub message: String,
}

impl MethodError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_ARGUMENTS,
            message: message.into(),
        }
    }
}

impl Display for MethodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MethodError {}

impl From<PlayerError> for MethodError {
    fn from(value: PlayerError) -> Self {
        match value {
            PlayerError::InvalidArguments(message) => Self {
                code: INVALID_ARGUMENTS,
                message,
            },
            PlayerError::InvalidState(message) => Self {
                code: INVALID_STATE,
                message,
            },
            PlayerError::Device(message) => Self {
                code: DEVICE_ERROR,
                message,
            },
            PlayerError::Aborted => Self {
                code: ABORTED,
                message: PlayerError::Aborted.to_string(),
            },
        }
    }
}

pub type MethodResult = Result<Value, MethodError>;

impl StreamingAudioPlugin {
    /// Dispatch one host method call.
    ///
    /// Successful calls return `Value::Null`. `streamComplete` blocks until
    /// playback has drained.
    pub fn handle_method_call(&self, method: &str, arguments: &Value) -> MethodResult {
        debug!("method call: {}", method);
        match method {
            "initializeAudioPlayer" => {
                if self.current_player().is_some() {
                    return Err(MethodError::invalid_arguments(
                        "An AudioPlayer instance already exists, call destroyAudioPlayer",
                    ));
                }
                let (sample_rate, channels) = parse_initialize_arguments(arguments).ok_or_else(|| {
                    MethodError::invalid_arguments("Invalid arguments for initializeAudioPlayer")
                })?;
                self.initialize_audio_player(sample_rate, channels)?;
            }
            "destroyAudioPlayer" => self.destroy_audio_player(),
            "startPlayback" => self.start_playback(),
            "stopPlayback" => self.stop_playback(),
            "addAudioData" => {
                let audio_data = parse_audio_data(arguments).ok_or_else(|| {
                    MethodError::invalid_arguments("Invalid arguments for addAudioData")
                })?;
                self.add_audio_data(&audio_data)?;
            }
            "streamComplete" => self.stream_complete()?,
            _ => {
                return Err(MethodError::invalid_arguments(format!(
                    "Unknown method {}",
                    method
                )))
            }
        }
        Ok(Value::Null)
    }
}

fn arguments_map(arguments: &Value) -> Option<&Map<String, Value>> {
    arguments.as_object()
}

fn parse_initialize_arguments(arguments: &Value) -> Option<(f64, i64)> {
    let arguments = arguments_map(arguments)?;
    let sample_rate = arguments.get("sampleRate")?.as_f64()?;
    let channels = arguments.get("channels")?.as_i64()?;
    Some((sample_rate, channels))
}

fn parse_audio_data(arguments: &Value) -> Option<Vec<u8>> {
    let audio_data = arguments_map(arguments)?.get("audioData")?.as_array()?;
    audio_data
        .iter()
        .map(|byte| byte.as_u64().and_then(|byte| u8::try_from(byte).ok()))
        .collect()
}
