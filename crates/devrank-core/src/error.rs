//! Unified error types for devrank Core.

use devrank_types::CollectionError;
use thiserror::Error;

/// Error type for local state and measurement sources.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A measurement source failed.
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
}

/// Result type alias for devrank operations.
pub type AppResult<T> = Result<T, AppError>;
