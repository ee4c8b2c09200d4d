//! Crate-wide error types.
//!
//! Every fallible operation in the storage and service layers returns
//! [`ShortenerError`]. Outcome-style variants (`NotFound`, `Gone`, `Conflict`)
//! carry enough payload for the transport layer to map them to distinct
//! status codes without re-querying the backend.

use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortenerError {
    /// The short code was never allocated.
    NotFound(String),
    /// The short code exists but has been tombstoned.
    Gone(String),
    /// The original URL is already mapped; carries the prior short code.
    Conflict { existing_code: String },
    /// The generator failed to produce a free short code.
    CodeSpaceExhausted { attempts: u32 },
    /// The operation is not supported by the active backend.
    NotImplemented(String),
    /// Input failed the length bounds.
    Validation(String),
    /// Unexpected backend failure, wrapping the underlying cause.
    Storage(String),
    /// JSON (de)serialization failure.
    Serialization(String),
}

impl ShortenerError {
    /// Error code string for protocol conversion.
    pub fn code(&self) -> &'static str {
        match self {
            ShortenerError::NotFound(_) => "NOT_FOUND",
            ShortenerError::Gone(_) => "GONE",
            ShortenerError::Conflict { .. } => "CONFLICT",
            ShortenerError::CodeSpaceExhausted { .. } => "CODE_SPACE_EXHAUSTED",
            ShortenerError::NotImplemented(_) => "NOT_IMPLEMENTED",
            ShortenerError::Validation(_) => "VALIDATION_ERROR",
            ShortenerError::Storage(_) => "STORAGE_ERROR",
            ShortenerError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortenerError::NotFound(msg.into())
    }

    pub fn gone<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Gone(msg.into())
    }

    pub fn not_implemented<T: Into<String>>(msg: T) -> Self {
        ShortenerError::NotImplemented(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Validation(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Storage(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Serialization(msg.into())
    }
}

impl fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortenerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ShortenerError::Gone(msg) => write!(f, "Gone: {}", msg),
            ShortenerError::Conflict { existing_code } => {
                write!(f, "URL already shortened as: {}", existing_code)
            }
            ShortenerError::CodeSpaceExhausted { attempts } => {
                write!(
                    f,
                    "Could not allocate a unique short code in {} attempts",
                    attempts
                )
            }
            ShortenerError::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            ShortenerError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ShortenerError::Storage(msg) => write!(f, "Storage error: {}", msg),
            ShortenerError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ShortenerError {}

impl From<sqlx::Error> for ShortenerError {
    fn from(err: sqlx::Error) -> Self {
        ShortenerError::Storage(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for ShortenerError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        ShortenerError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ShortenerError {
    fn from(err: std::io::Error) -> Self {
        ShortenerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ShortenerError {
    fn from(err: serde_json::Error) -> Self {
        ShortenerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortenerError>;
