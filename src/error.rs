use thiserror::Error;

/// Errors returned by GenVR API operations.
#[derive(Error, Debug)]
pub enum GenVrError {
    /// The API returned a non-success HTTP status.
    #[error("GenVR returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response parsed but was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// The API reported `success: false`, or the job's own status was
    /// `failed`. Carries the remote's message.
    #[error("GenVR request failed: {0}")]
    Remote(String),

    /// The job did not reach a terminal status within the poll cap.
    #[error("Job timed out waiting for completion")]
    Timeout,

    /// Cancellation was requested before the job finished.
    #[error("Job was cancelled")]
    Cancelled,

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GenVrError>;
