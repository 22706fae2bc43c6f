//! Retry policy: what to retry and how long to wait.

use crate::backoff::Backoff;
use crate::error::{PolicyError, PolicyResult};
use crate::failure::{cause_chain, Classify, FailureKind};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Caller-supplied classification that replaces the built-in kind checks.
pub type RetryPredicate = Arc<dyn Fn(&dyn Classify) -> bool + Send + Sync>;

/// Status codes treated as transient by [`RetryPolicy::default_api`].
pub const TRANSIENT_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Immutable retry configuration.
///
/// A policy decides whether a failure is worth retrying and how long to wait
/// before the next attempt. It holds no execution state, so one policy can be
/// shared by any number of executors.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    retryable_kinds: BTreeSet<FailureKind>,
    retryable_status_codes: BTreeSet<u16>,
    custom_predicate: Option<RetryPredicate>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("retryable_kinds", &self.retryable_kinds)
            .field("retryable_status_codes", &self.retryable_status_codes)
            .field("custom_predicate", &self.custom_predicate.is_some())
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::default_api()
    }
}

impl RetryPolicy {
    /// Create a builder with empty classification sets.
    #[must_use]
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Policy for API calls: 3 retries, exponential backoff from 1s doubling
    /// up to 30s, transient network kinds and gateway/throttling status codes.
    pub fn default_api() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::exponential(Duration::from_secs(1), 2.0, Duration::from_secs(30)),
            retryable_kinds: [
                FailureKind::ConnectionFailure,
                FailureKind::Cancelled,
                FailureKind::Timeout,
                FailureKind::SocketError,
            ]
            .into_iter()
            .collect(),
            retryable_status_codes: TRANSIENT_STATUS_CODES.into_iter().collect(),
            custom_predicate: None,
        }
    }

    /// Policy for UI interactions: 2 retries with a flat 2s delay, retrying
    /// timeouts and elements in the wrong state.
    pub fn default_ui() -> Self {
        Self {
            max_attempts: 2,
            backoff: Backoff::fixed(Duration::from_secs(2)),
            retryable_kinds: [FailureKind::Timeout, FailureKind::InvalidOperation]
                .into_iter()
                .collect(),
            retryable_status_codes: BTreeSet::new(),
            custom_predicate: None,
        }
    }

    /// Policy with a flat delay and an explicit set of retryable kinds.
    pub fn custom(
        max_attempts: u32,
        delay: Duration,
        retryable_kinds: impl IntoIterator<Item = FailureKind>,
    ) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::fixed(delay),
            retryable_kinds: retryable_kinds.into_iter().collect(),
            retryable_status_codes: BTreeSet::new(),
            custom_predicate: None,
        }
    }

    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self::custom(0, Duration::ZERO, std::iter::empty())
    }

    /// Start a builder from this policy's values.
    #[must_use]
    pub fn to_builder(&self) -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            max_attempts: Some(self.max_attempts),
            base_delay: Some(self.backoff.base_delay),
            exponential: Some(self.backoff.exponential),
            multiplier: Some(self.backoff.multiplier),
            max_delay: Some(self.backoff.max_delay),
            retryable_kinds: self.retryable_kinds.clone(),
            retryable_status_codes: self.retryable_status_codes.clone(),
            custom_predicate: self.custom_predicate.clone(),
        }
    }

    /// Number of retries after the first attempt.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the first retry, or the flat delay.
    pub fn base_delay(&self) -> Duration {
        self.backoff.base_delay
    }

    /// Whether delays grow exponentially.
    pub fn use_exponential_backoff(&self) -> bool {
        self.backoff.exponential
    }

    /// Growth factor for exponential delays.
    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff.multiplier
    }

    /// Cap on exponential delays.
    pub fn max_delay(&self) -> Duration {
        self.backoff.max_delay
    }

    /// Delay schedule.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Kinds considered transient.
    pub fn retryable_kinds(&self) -> &BTreeSet<FailureKind> {
        &self.retryable_kinds
    }

    /// Status codes considered transient.
    pub fn retryable_status_codes(&self) -> &BTreeSet<u16> {
        &self.retryable_status_codes
    }

    /// Whether a custom predicate replaces the kind checks.
    pub fn has_custom_predicate(&self) -> bool {
        self.custom_predicate.is_some()
    }

    /// Decide whether a failure is transient.
    ///
    /// A custom predicate, when set, is the only thing consulted. Otherwise
    /// the cause chain is walked outermost first and the first retryable kind
    /// wins. Status codes are not considered here; see
    /// [`should_retry_status`](Self::should_retry_status).
    pub fn should_retry(&self, failure: &dyn Classify) -> bool {
        if let Some(predicate) = &self.custom_predicate {
            return predicate(failure);
        }

        cause_chain(failure).any(|f| self.retryable_kinds.contains(&f.kind()))
    }

    /// Decide whether a response status code is transient.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Delay before the retry that follows `attempt` (0-based).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        self.backoff.calculate_delay(attempt)
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Default)]
pub struct RetryPolicyBuilder {
    max_attempts: Option<u32>,
    base_delay: Option<Duration>,
    exponential: Option<bool>,
    multiplier: Option<f64>,
    max_delay: Option<Duration>,
    retryable_kinds: BTreeSet<FailureKind>,
    retryable_status_codes: BTreeSet<u16>,
    custom_predicate: Option<RetryPredicate>,
}

impl fmt::Debug for RetryPolicyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicyBuilder")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("exponential", &self.exponential)
            .field("multiplier", &self.multiplier)
            .field("max_delay", &self.max_delay)
            .field("retryable_kinds", &self.retryable_kinds)
            .field("retryable_status_codes", &self.retryable_status_codes)
            .field("custom_predicate", &self.custom_predicate.is_some())
            .finish()
    }
}

impl RetryPolicyBuilder {
    /// Set the number of retries after the first attempt.
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    /// Set the base delay.
    #[must_use]
    pub fn base_delay(mut self, d: Duration) -> Self {
        self.base_delay = Some(d);
        self
    }

    /// Enable or disable exponential growth.
    #[must_use]
    pub fn exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential = Some(enabled);
        self
    }

    /// Set the growth factor.
    #[must_use]
    pub fn backoff_multiplier(mut self, m: f64) -> Self {
        self.multiplier = Some(m);
        self
    }

    /// Set the cap on exponential delays.
    #[must_use]
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add a retryable kind.
    #[must_use]
    pub fn retry_on(mut self, kind: FailureKind) -> Self {
        self.retryable_kinds.insert(kind);
        self
    }

    /// Add several retryable kinds.
    #[must_use]
    pub fn retry_on_kinds(mut self, kinds: impl IntoIterator<Item = FailureKind>) -> Self {
        self.retryable_kinds.extend(kinds);
        self
    }

    /// Add retryable status codes.
    #[must_use]
    pub fn retry_on_status(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes.extend(codes);
        self
    }

    /// Replace built-in kind classification with a predicate.
    #[must_use]
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&dyn Classify) -> bool + Send + Sync + 'static,
    {
        self.custom_predicate = Some(Arc::new(predicate));
        self
    }

    /// Remove a previously set predicate.
    #[must_use]
    pub fn clear_predicate(mut self) -> Self {
        self.custom_predicate = None;
        self
    }

    /// Build the policy.
    ///
    /// Unset values take the [`Backoff::default`] schedule and three retries.
    pub fn build(self) -> PolicyResult<RetryPolicy> {
        let defaults = Backoff::default();
        let multiplier = self.multiplier.unwrap_or(defaults.multiplier);
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(PolicyError::InvalidMultiplier(multiplier));
        }

        Ok(RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(3),
            backoff: Backoff {
                base_delay: self.base_delay.unwrap_or(defaults.base_delay),
                exponential: self.exponential.unwrap_or(defaults.exponential),
                multiplier,
                max_delay: self.max_delay.unwrap_or(defaults.max_delay),
            },
            retryable_kinds: self.retryable_kinds,
            retryable_status_codes: self.retryable_status_codes,
            custom_predicate: self.custom_predicate,
        })
    }
}
