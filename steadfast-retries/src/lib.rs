//! # steadfast-retries
//!
//! Retry policy and executor for transient failures.
//!
//! This crate wraps a unit of work, synchronous or asynchronous, and runs it
//! again when it fails with a transient error, waiting between attempts and
//! finally handing back either the result or the caller's own failure.
//!
//! ## Core Concepts
//!
//! - **[`RetryPolicy`]**: Immutable rules for what to retry and how long to wait
//! - **[`Classify`]**: How a failure exposes its kind, cause and status code
//! - **[`RetryExecutor`]**: Runs the bounded attempt loop
//! - **[`RetryLogger`]**: Receives one [`RetryEvent`] per loop transition
//!
//! ## Presets
//!
//! - [`RetryPolicy::default_api`]: 3 retries, exponential 1s → 30s,
//!   network kinds, status codes 408/429/500/502/503/504
//! - [`RetryPolicy::default_ui`]: 2 retries, flat 2s, timeouts and
//!   invalid-operation failures
//! - [`RetryPolicy::custom`]: explicit retries, delay and kinds
//!
//! ## Example
//!
//! ```ignore
//! use steadfast_retries::{Failure, RetryExecutor, RetryPolicy};
//!
//! let executor = RetryExecutor::new(RetryPolicy::default_api());
//!
//! let user = executor
//!     .execute("load user", || async {
//!         api.load_user(42).await.map_err(|e| Failure::connection(e.to_string()))
//!     })
//!     .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod executor;
pub mod failure;
pub mod logging;
pub mod policy;

// Re-exports
pub use backoff::Backoff;
pub use config::PolicySettings;
pub use error::{Cancelled, PolicyError, PolicyResult};
pub use executor::{with_retry, RetryExecutor};
pub use failure::{cause_chain, Classify, Failure, FailureKind};
pub use logging::{
    GiveUpReason, NullLogger, RecordingLogger, RetryEvent, RetryLogger, TracingLogger,
};
pub use policy::{RetryPolicy, RetryPolicyBuilder, RetryPredicate, TRANSIENT_STATUS_CODES};
pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        with_retry, Classify, Failure, FailureKind, RetryExecutor, RetryLogger, RetryPolicy,
    };
}
