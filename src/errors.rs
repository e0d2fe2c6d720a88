use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed observation: {0}")]
    MalformedObservation(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        EngineError::MalformedObservation(msg.into())
    }
}
