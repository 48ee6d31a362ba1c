use thiserror::Error;

/// Errors surfaced at the library boundary.
///
/// Missing or oddly shaped archive sections are never errors; extractors
/// absorb them and produce empty tables.
#[derive(Error, Debug)]
pub enum MeltError {
    /// The raw input could not be parsed as JSON
    #[error("Failed to parse: {0}")]
    Parse(String),

    /// An operation was requested before its input exists
    #[error("{0}")]
    InvalidState(&'static str),

    /// Schema or insert generation was handed an unusable normalized mapping
    #[error("{0}")]
    Generation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MeltError>;
