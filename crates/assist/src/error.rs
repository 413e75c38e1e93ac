//! Text-completion error types

/// Assist result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the text-completion service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No API key configured, or the backend is switched off
    #[error("Text-completion service unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unusable response: {0}")]
    Parse(String),

    #[error("No response within {0}ms")]
    Timeout(u64),
}
