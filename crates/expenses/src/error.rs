use api_types::expense::FieldErrors;
use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the expense backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    /// The backend answered with a field-keyed error body.
    #[error("{status}: request rejected")]
    Rejected {
        status: StatusCode,
        errors: FieldErrors,
    },
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Maps transport errors, folding reqwest timeouts into [`ApiError::Timeout`].
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}
