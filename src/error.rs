use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Coactor
#[derive(Error, Debug)]
pub enum CoactorError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network failures talking to TMDb
    #[error("TMDb API error: {0}")]
    Api(String),

    /// TMDb responded but the body could not be decoded
    #[error("Failed to decode TMDb response: {0}")]
    Decode(String),

    /// Non-success HTTP status from TMDb
    #[error("TMDb API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// A row in a nodes/edges table could not be read
    #[error("Malformed row in {} at line {line}: {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A crawl was requested with unusable parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoactorError {
    /// Whether a request that failed with this error is worth repeating.
    /// Rate limiting (429), server-side failures (5xx) and transport errors qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoactorError::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            CoactorError::Api(_) => true,
            _ => false,
        }
    }
}

/// Convenient Result type using CoactorError
pub type Result<T> = std::result::Result<T, CoactorError>;
