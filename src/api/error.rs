// ABOUTME: Error type for control-plane requests.
// ABOUTME: Separates rejected tokens and unknown targets from other HTTP failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("the control plane rejected the API token")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no target with id or nickname '{0}'")]
    UnknownTarget(String),

    #[error("control plane returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("control plane returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("control plane request failed: {0}")]
    Request(#[from] reqwest::Error),
}
