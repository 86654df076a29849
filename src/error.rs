//! Error types for orbita.
//!
//! Every variant maps to one HTTP status class:
//! - `NotFound`: 404
//! - `Unauthenticated` and `Identity`: 401
//! - `Validation`: 400
//! - everything else: 500

use thiserror::Error;

/// Main error type for orbita operations
#[derive(Error, Debug)]
pub enum Error {
    // Caller errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    // Internal failures
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn task_not_found(id: i64) -> Self {
        Error::NotFound(format!("Task {}", id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::Unauthenticated | Error::Identity(_) => 401,
            Error::Validation(_) => 400,
            Error::Store(_) | Error::Io(_) | Error::Json(_) => 500,
        }
    }

    /// Whether the failure came from the caller rather than from orbita itself.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

pub type Result<T> = std::result::Result<T, Error>;
