//! Error types for stress field injection

use thiserror::Error;

/// Main error type for stress field operations
#[derive(Error, Debug)]
pub enum StressFieldError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No mesh present in any part instance")]
    NoMesh,

    #[error("Callback failed: {0}")]
    Callback(#[from] CallbackError),

    #[error("Field script error: {0}")]
    Script(String),

    #[error("Deck error: {0}")]
    Deck(#[from] DeckError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for stress field operations
pub type StressFieldResult<T> = Result<T, StressFieldError>;

/// Raised when the marker scanner runs off the end of a deck
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeckError {
    #[error("marker '{marker}' not found before line {line} (pending parts: {pending:?})")]
    MarkerNotFound {
        marker: &'static str,
        line: usize,
        pending: Vec<String>,
    },
}

/// Errors reported by a solver host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Unknown job: {0}")]
    UnknownJob(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Execution error: {0}")]
    ExecutionError(String),
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
}

/// Error returned by a user supplied stress, category or error function
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
