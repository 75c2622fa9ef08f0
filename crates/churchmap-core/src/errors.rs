use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("feature not found")]
    NotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error("unknown filter field: {0}")]
    UnknownField(String),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("chunk {index} failed: {reason}")]
    Chunk { index: usize, reason: String },
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
