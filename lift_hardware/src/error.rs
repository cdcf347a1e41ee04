use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("hardware unavailable: {0}")]
    Unavailable(String),
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
