use std::io;

/// Setup and presentation errors. Parsing itself never fails.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("render target '{0}' not found")]
    TargetNotFound(String),

    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("invalid token length range {min}..={max}")]
    InvalidTokenRange { min: usize, max: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
