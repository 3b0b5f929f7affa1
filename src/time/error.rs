use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CueTimeError {
    #[error("Time value out of range: {0} frames")]
    Overflow(i128),

    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}

pub type CueTimeResult<T> = Result<T, CueTimeError>;
