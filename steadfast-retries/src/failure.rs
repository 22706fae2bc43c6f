//! Failure model used for retry classification.
//!
//! The policy never inspects concrete error types. Instead, every failure
//! handed to the executor exposes a [`FailureKind`] tag, an optional nested
//! cause and an optional status code through the [`Classify`] trait. Adapters
//! map platform errors onto these tags at the boundary.

use crate::error::{Cancelled, PolicyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

/// Structural category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The remote end could not be reached or dropped the connection.
    ConnectionFailure,
    /// The operation did not complete in time.
    Timeout,
    /// The operation was cancelled before completing.
    Cancelled,
    /// Low-level socket failure.
    SocketError,
    /// The target was not in a state that allowed the operation.
    InvalidOperation,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Every kind, in declaration order.
    pub const ALL: [FailureKind; 6] = [
        FailureKind::ConnectionFailure,
        FailureKind::Timeout,
        FailureKind::Cancelled,
        FailureKind::SocketError,
        FailureKind::InvalidOperation,
        FailureKind::Other,
    ];

    /// Kebab-case name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ConnectionFailure => "connection-failure",
            FailureKind::Timeout => "timeout",
            FailureKind::Cancelled => "cancelled",
            FailureKind::SocketError => "socket-error",
            FailureKind::InvalidOperation => "invalid-operation",
            FailureKind::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FailureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PolicyError::UnknownKind(s.to_string()))
    }
}

/// Classification view of a failure.
///
/// Implement this for your own error type to run it through a
/// [`RetryExecutor`](crate::RetryExecutor). Only [`kind`](Classify::kind) is
/// required.
pub trait Classify {
    /// Structural kind of this failure.
    fn kind(&self) -> FailureKind;

    /// The wrapped failure this one was caused by, if any.
    fn cause(&self) -> Option<&dyn Classify> {
        None
    }

    /// HTTP-like status code, present only for HTTP-shaped failures.
    fn status_code(&self) -> Option<u16> {
        None
    }
}

/// Iterate a failure and its causes, outermost first.
pub fn cause_chain<'a>(failure: &'a dyn Classify) -> impl Iterator<Item = &'a dyn Classify> + 'a {
    std::iter::successors(Some(failure), |current| current.cause())
}

/// General-purpose failure value.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    kind: FailureKind,
    message: String,
    status: Option<u16>,
    #[source]
    cause: Option<Box<Failure>>,
}

impl Failure {
    /// Create a failure of the given kind.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            cause: None,
        }
    }

    /// Create a connection failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ConnectionFailure, message)
    }

    /// Create a timeout failure.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }

    /// Create a cancellation failure.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Cancelled, message)
    }

    /// Create a socket failure.
    pub fn socket(message: impl Into<String>) -> Self {
        Self::new(FailureKind::SocketError, message)
    }

    /// Create an invalid-operation failure.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidOperation, message)
    }

    /// Create an uncategorized failure.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Other, message)
    }

    /// Attach a status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Wrap another failure as the cause of this one.
    #[must_use]
    pub fn caused_by(mut self, cause: Failure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Failure message, without the kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The directly wrapped failure.
    pub fn inner(&self) -> Option<&Failure> {
        self.cause.as_deref()
    }
}

impl Classify for Failure {
    fn kind(&self) -> FailureKind {
        self.kind
    }

    fn cause(&self) -> Option<&dyn Classify> {
        self.cause.as_deref().map(|c| c as &dyn Classify)
    }

    fn status_code(&self) -> Option<u16> {
        self.status
    }
}

impl From<Cancelled> for Failure {
    fn from(err: Cancelled) -> Self {
        Failure::cancelled(err.to_string())
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        Failure::new(err.kind().into(), err.to_string())
    }
}

impl Classify for io::Error {
    fn kind(&self) -> FailureKind {
        io::Error::kind(self).into()
    }
}

impl From<io::ErrorKind> for FailureKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected => FailureKind::ConnectionFailure,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FailureKind::Timeout,
            io::ErrorKind::Interrupted => FailureKind::Cancelled,
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::AddrInUse
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::UnexpectedEof => FailureKind::SocketError,
            _ => FailureKind::Other,
        }
    }
}
