use thiserror::Error;

/// Errors surfaced by backend operations.
///
/// Aborted requests (debounce or timeout cancellation) are deliberately a
/// separate variant from genuine failures: callers discard them silently
/// instead of surfacing a toast.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("request aborted")]
    Aborted,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not authorized: {0}")]
    Authorization(String),
    #[error("record not found")]
    NotFound,
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },
}

impl ApiError {
    /// Whether this error represents a client-initiated cancellation rather
    /// than a real failure. Aborted results are discarded, never surfaced.
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
