use thiserror::Error;

/// Error taxonomy shared by the stores, the engine and the transport adapter.
///
/// The variants are kept distinct all the way up so callers can map them to
/// stable external status codes. `Database` covers transient store failures
/// (begin/commit, connectivity); the enclosing transaction is always rolled
/// back, so the whole operation is safe to retry.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TimelineError {
    /// Whether retrying the same request unchanged can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TimelineError::Database(_))
    }
}

pub type TimelineResult<T> = Result<T, TimelineError>;
