use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Startup-time failures. None of these are recoverable: the caller is
/// expected to report them and exit.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no audio output device available")]
    NoDeviceAvailable,

    #[error("output device not found: {0}")]
    DeviceNotFound(String),

    #[error("audio backend error: {0}")]
    Backend(String),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// A single keyboard read failed. The input loop treats this cycle as
/// "no keys pressed" and polls again on the next one.
#[derive(Debug, Error)]
#[error("keyboard poll failed: {0}")]
pub struct PollError(#[from] pub std::io::Error);
