use thiserror::Error;

/// Errors returned by LiblibAI operations.
///
/// A job that ends in `FAILED` or `TIMEOUT` is not an error: it comes back as
/// a normal [`Prediction`](crate::Prediction) whose status says so.
#[derive(Error, Debug)]
pub enum LiblibError {
    /// Client configuration is unusable (missing credential, bad base URL).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The caller passed input no request can be built from.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Transport {
        context: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LiblibAI returned a non-success HTTP status.
    #[error("LiblibAI returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    /// The service accepted the request envelope but returned no job.
    #[error("Submission rejected (code {code}): {msg}")]
    Submission { code: i64, msg: String },

    /// The response from LiblibAI was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polling was aborted through its cancellation token.
    #[error("Polling was cancelled")]
    Cancelled,

    /// Polling ran past the caller-supplied deadline.
    #[error("Polling deadline exceeded")]
    DeadlineExceeded,
}

impl LiblibError {
    pub(crate) fn transport(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LiblibError::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LiblibError>;
