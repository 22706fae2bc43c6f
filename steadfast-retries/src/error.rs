//! Error types owned by the retry engine.
//!
//! The executor never wraps the caller's failures; these are the only errors
//! the crate itself produces.

use thiserror::Error;

/// A retry policy could not be constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// Backoff multiplier is NaN, infinite, or not positive.
    #[error("backoff multiplier must be a finite positive number, got {0}")]
    InvalidMultiplier(f64),

    /// Unknown failure kind name in settings.
    #[error("unknown failure kind: {0}")]
    UnknownKind(String),
}

/// Signal raised when a retried operation is cancelled.
///
/// Failure types that support cancellation implement `From<Cancelled>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Result type for policy construction.
pub type PolicyResult<T> = Result<T, PolicyError>;
