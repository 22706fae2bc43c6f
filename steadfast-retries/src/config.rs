//! Serializable retry settings.
//!
//! The engine never reads files or the environment itself. Callers that keep
//! retry settings in their own configuration layer deserialize a
//! [`PolicySettings`] and convert it into a [`RetryPolicy`].

use crate::error::PolicyError;
use crate::failure::FailureKind;
use crate::policy::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Plain-data form of a [`RetryPolicy`].
///
/// Missing fields take the values of [`RetryPolicy::default_api`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Retries after the first attempt.
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Grow delays exponentially.
    pub use_exponential_backoff: bool,
    /// Exponential growth factor.
    pub backoff_multiplier: f64,
    /// Delay cap in milliseconds.
    pub max_delay_ms: u64,
    /// Kinds to retry.
    pub retryable_kinds: BTreeSet<FailureKind>,
    /// Status codes to retry.
    pub retryable_status_codes: BTreeSet<u16>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        RetryPolicy::default_api().settings()
    }
}

impl RetryPolicy {
    /// Export this policy's settings. The custom predicate is not carried.
    pub fn settings(&self) -> PolicySettings {
        PolicySettings {
            max_attempts: self.max_attempts(),
            base_delay_ms: duration_to_ms(self.base_delay()),
            use_exponential_backoff: self.use_exponential_backoff(),
            backoff_multiplier: self.backoff_multiplier(),
            max_delay_ms: duration_to_ms(self.max_delay()),
            retryable_kinds: self.retryable_kinds().clone(),
            retryable_status_codes: self.retryable_status_codes().clone(),
        }
    }
}

impl TryFrom<PolicySettings> for RetryPolicy {
    type Error = PolicyError;

    fn try_from(settings: PolicySettings) -> Result<Self, Self::Error> {
        RetryPolicy::builder()
            .max_attempts(settings.max_attempts)
            .base_delay(Duration::from_millis(settings.base_delay_ms))
            .exponential_backoff(settings.use_exponential_backoff)
            .backoff_multiplier(settings.backoff_multiplier)
            .max_delay(Duration::from_millis(settings.max_delay_ms))
            .retry_on_kinds(settings.retryable_kinds)
            .retry_on_status(settings.retryable_status_codes)
            .build()
    }
}

fn duration_to_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
