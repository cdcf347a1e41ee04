use std::time::Duration;

use thiserror::Error;

/// Why the output driver refused or failed a pulse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverFault {
    #[error("unknown channel {0}")]
    UnknownChannel(String),
    #[error("hardware unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElevationError {
    #[error("target {0}% is outside 0..=100")]
    InvalidTarget(i64),
    #[error("invalid mode {0}: must be between 1 and 4")]
    InvalidMode(i64),
    #[error("configuration error: channel {0} is not mapped to an output")]
    MissingChannel(String),
    #[error(
        "configuration error: {channel} pulse of {requested:?} exceeds the {ceiling:?} ceiling"
    )]
    PulseCeiling {
        channel: String,
        requested: Duration,
        ceiling: Duration,
    },
    #[error("driver error: {0}")]
    Driver(DriverFault),
    #[error("cancelled after {completed} of {total} pulses")]
    Cancelled { completed: usize, total: usize },
}

/// Which side of the request boundary is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input; nothing was actuated.
    Client,
    /// Broken deployment, hardware fault or interruption.
    Server,
}

impl ElevationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidTarget(_) | Self::InvalidMode(_) => ErrorClass::Client,
            _ => ErrorClass::Server,
        }
    }

    /// Raised before any output was touched because the rig is misconfigured.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingChannel(_) | Self::PulseCeiling { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing output driver")]
    MissingDriver,
    #[error("missing channel map")]
    MissingChannels,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, ElevationError>;
