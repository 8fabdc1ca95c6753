// ABOUTME: Error type for object storage operations.
// ABOUTME: Distinguishes not-found (often expected) from transport and HTTP failures.

/// Errors returned by an [`ObjectStore`](super::ObjectStore) backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The object or directory does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The backend refused the credentials.
    #[error("access denied for {0}")]
    Unauthorized(String),

    /// The backend answered with an unexpected status.
    #[error("storage returned HTTP {status} for {key}: {message}")]
    Http {
        status: u16,
        key: String,
        message: String,
    },

    /// The request never completed (connection, timeout, body read).
    #[error("storage request failed: {0}")]
    Transport(String),

    /// A directory listing could not be decoded.
    #[error("invalid listing for {key}: {message}")]
    InvalidListing { key: String, message: String },
}

impl StoreError {
    /// Whether the backend reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}
