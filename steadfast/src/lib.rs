//! # Steadfast - Policy-Driven Retries
//!
//! Steadfast wraps a unit of work and runs it again when it fails with a
//! transient error. It was built for test automation, where API calls time
//! out and UI elements go stale, but nothing in it is specific to testing.
//!
//! ## Quick Start
//!
//! ```ignore
//! use steadfast::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Failure> {
//!     let executor = RetryExecutor::for_api();
//!
//!     let token = executor
//!         .execute("login", || async { login().await })
//!         .await?;
//!     println!("logged in: {token}");
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Kind-based classification** that walks the whole cause chain
//! - **Status-code classification** for error responses
//! - **Custom predicates** that replace the built-in rules
//! - **Deterministic backoff**: fixed, or exponential with a cap, never jittered
//! - **Four call shapes**: async or sync, with or without a value
//! - **Structured logging** of every attempt through `tracing`
//! - **Cancellation** through `tokio_util::sync::CancellationToken`
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `http` | `reqwest` client with retries | ✅ |
//! | `full` | All features | ❌ |
//!
//! ## Architecture
//!
//! - [`steadfast_retries`] - Policy, failure model, executor, logging
//! - [`steadfast_http`] - HTTP client with retries (optional)
//!
//! ## Examples
//!
//! ### Synchronous work
//!
//! ```ignore
//! use steadfast::prelude::*;
//!
//! let executor = RetryExecutor::for_ui();
//! executor
//!     .execute_sync_unit("click submit", || page.click("#submit"))
//!     .await?;
//! ```
//!
//! ### Policy from settings
//!
//! ```ignore
//! use steadfast::retries::PolicySettings;
//! use steadfast::prelude::*;
//!
//! let settings: PolicySettings = serde_json::from_str(&raw)?;
//! let policy = RetryPolicy::try_from(settings)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use steadfast_retries as retries;

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use steadfast_http as http;

pub use steadfast_retries::{
    Cancelled, Classify, Failure, FailureKind, PolicyError, RetryExecutor, RetryPolicy,
};

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use steadfast_http::{HttpError, RetryClient};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::retries::{
        with_retry, CancellationToken, Classify, Failure, FailureKind, RecordingLogger,
        RetryEvent, RetryExecutor, RetryLogger, RetryPolicy,
    };

    #[cfg(feature = "http")]
    pub use crate::http::{HttpError, RetryClient};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
