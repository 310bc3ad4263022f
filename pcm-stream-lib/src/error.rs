use std::fmt::{Display, Formatter};

/// Error type for player lifecycle, sample intake and output device setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// Malformed or missing call parameters, or a double initialization.
    InvalidArguments(String),
    /// The operation needs a player that does not exist.
    InvalidState(String),
    /// The output device could not be opened or started.
    Device(String),
    /// A blocking wait was interrupted because the player was torn down.
    Aborted,
}

impl Display for PlayerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArguments(err) => write!(f, "invalid arguments: {}", err),
            Self::InvalidState(err) => write!(f, "invalid state: {}", err),
            Self::Device(err) => write!(f, "output device error: {}", err),
            Self::Aborted => write!(f, "playback was torn down before completion"),
        }
    }
}

impl std::error::Error for PlayerError {}

impl From<std::io::Error> for PlayerError {
    fn from(value: std::io::Error) -> Self {
        Self::Device(value.to_string())
    }
}
