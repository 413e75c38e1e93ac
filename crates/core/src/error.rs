//! Error types for Vigil Core

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage failure during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Volunteer {volunteer_id} already holds a commitment for request {request_id}")]
    AlreadyCommitted { request_id: Uuid, volunteer_id: Uuid },

    #[error("Prayer request {0} is not active")]
    RequestNotActive(Uuid),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Attach the name of the failing operation to a raw storage error.
    ///
    /// Domain errors pass through untouched.
    pub fn during(self, operation: &'static str) -> Self {
        match self {
            Error::Database(source) => Error::Storage { operation, source },
            other => other,
        }
    }

    /// Whether this error came from the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Storage { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
