use thiserror::Error;

/// Errors returned by every public operation of the media client.
///
/// Upload-phase variants carry the source path they failed on, and
/// `Submission` keeps the raw response body for diagnostics.
#[derive(Error, Debug)]
pub enum RedmedError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{extension} not supported for {path}")]
    UnsupportedMediaType { path: String, extension: String },

    #[error("downloading {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("requesting upload lease for {path}: {reason}")]
    LeaseNegotiation { path: String, reason: String },

    #[error("uploading {path}: {reason}")]
    Transfer { path: String, reason: String },

    #[error("executing submission request: {reason}: {body}")]
    Submission { reason: String, body: String },

    #[error("completion channel error: {0}")]
    Channel(String),

    #[error("post processing failed: {0}")]
    CompletionFailure(String),

    #[error("timed out waiting for post completion")]
    CompletionTimeout,

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid request: {field} - {message}")]
    InvalidRequest { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RedmedError>;

impl RedmedError {
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::InvalidRequest {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// True for errors caused by the caller's cancel signal or deadline
    /// rather than by the remote service.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::DeadlineExceeded | Self::CompletionTimeout
        )
    }
}
