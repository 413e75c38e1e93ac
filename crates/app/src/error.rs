//! Command-line error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] vigil_core::Error),

    #[error("Text-completion client: {0}")]
    Assist(#[from] vigil_assist::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
