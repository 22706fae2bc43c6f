//! HTTP error types.

use steadfast_retries::{Cancelled, Classify, FailureKind};
use thiserror::Error;

/// Errors produced by [`RetryClient`](crate::RetryClient).
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request never produced a response.
    #[error("HTTP transport error ({kind}): {source}")]
    Transport {
        /// Kind the transport failure maps onto.
        kind: FailureKind,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
        /// Whether the policy listed this status as transient.
        transient: bool,
    },

    /// The call was cancelled.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl HttpError {
    /// Create a status error.
    pub fn status(status: u16, body: impl Into<String>, transient: bool) -> Self {
        Self::Status {
            status,
            body: body.into(),
            transient,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() {
            FailureKind::ConnectionFailure
        } else if err.is_builder() || err.is_decode() || err.is_redirect() {
            FailureKind::Other
        } else if err.is_request() || err.is_body() {
            FailureKind::SocketError
        } else {
            FailureKind::Other
        };
        Self::Transport { kind, source: err }
    }
}

impl Classify for HttpError {
    fn kind(&self) -> FailureKind {
        match self {
            // A transient status is reported the same way a failed request is.
            Self::Status { transient: true, .. } => FailureKind::ConnectionFailure,
            Self::Status { .. } => FailureKind::Other,
            Self::Transport { kind, .. } => *kind,
            Self::Cancelled(_) => FailureKind::Cancelled,
        }
    }

    fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Cancelled(_) => None,
        }
    }
}

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;
