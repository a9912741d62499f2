//! Errors that can end a battery refresh.

use thiserror::Error;

/// Shown to the user whenever a refresh fails, whatever the cause.
pub const USER_MESSAGE: &str =
    "unable to read battery information, confirm the device has a battery";

/// A type alias for acquisition results.
pub type AcquireResult<T> = std::result::Result<T, AcquireError>;

/// The ways acquiring a battery snapshot can fail. None of them are fatal; the
/// previous snapshot stays in place and the user may refresh again.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AcquireError {
    /// The external command or OS service is missing or could not be read.
    #[error("battery source unavailable: {0}")]
    SourceUnavailable(String),
    /// The OS reported an empty power-source list.
    #[error("no power source reported by the system")]
    NoPowerSource,
    /// Design capacity is zero after normalization.
    #[error("no battery detected")]
    NoBatteryDetected,
}

impl AcquireError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable(reason.into())
    }

    pub fn user_message(&self) -> &'static str {
        USER_MESSAGE
    }
}

