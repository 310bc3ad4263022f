use std::fmt::{Display, Formatter};

use pcm_stream_lib::error::PlayerError;

/// Error type for input loading and playback setup in the CLI.
#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Wav(hound::Error),
    InvalidInput(String),
    Player(PlayerError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Wav(err) => write!(f, "wav error: {}", err),
            Self::InvalidInput(err) => write!(f, "invalid input: {}", err),
            Self::Player(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<hound::Error> for CliError {
    fn from(value: hound::Error) -> Self {
        Self::Wav(value)
    }
}

impl From<PlayerError> for CliError {
    fn from(value: PlayerError) -> Self {
        Self::Player(value)
    }
}
