//! # steadfast-http
//!
//! HTTP client with automatic retries, built on `reqwest` and
//! [`steadfast_retries`].
//!
//! Transport errors are mapped onto [`FailureKind`](steadfast_retries::FailureKind)
//! tags (timeouts, refused connections, broken requests), and error responses
//! are checked against the policy's retryable status codes before being
//! surfaced.
//!
//! ## Example
//!
//! ```ignore
//! use steadfast_http::RetryClient;
//!
//! let client = RetryClient::for_api();
//! let response = client.get("https://api.example.com/health").await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;

pub use client::{RetryClient, RetryClientBuilder};
pub use error::{HttpError, HttpResult};
