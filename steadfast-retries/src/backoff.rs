//! Backoff delay calculation.
//!
//! Delays are deterministic: no jitter is ever applied, so the exact value
//! for a given attempt can be asserted in tests.

use std::time::Duration;

/// Default upper bound for exponential delays.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Default growth factor for exponential delays.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// Delay before the first retry, or the flat delay.
    pub base_delay: Duration,
    /// Whether the delay grows per attempt.
    pub exponential: bool,
    /// Growth factor per attempt.
    pub multiplier: f64,
    /// Upper bound on the exponential delay.
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::exponential(Duration::from_secs(1), DEFAULT_MULTIPLIER, DEFAULT_MAX_DELAY)
    }
}

impl Backoff {
    /// Flat delay for every attempt.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            base_delay: delay,
            exponential: false,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Exponential delay capped at `max_delay`.
    #[must_use]
    pub fn exponential(base_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            base_delay,
            exponential: true,
            multiplier,
            max_delay,
        }
    }

    /// Delay before the retry following `attempt` (0-based).
    ///
    /// Fixed schedules return `base_delay` unchanged. Exponential schedules
    /// return `min(base_delay * multiplier^attempt, max_delay)`.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if !self.exponential {
            return self.base_delay;
        }
        // 0 * inf is NaN, so a zero base never reaches the multiply.
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_nanos() as f64 * self.multiplier.powi(exponent);
        let cap = self.max_delay.as_nanos() as f64;

        if raw.is_nan() || raw >= cap {
            return self.max_delay;
        }
        nanos_to_duration(raw).min(self.max_delay)
    }
}

fn nanos_to_duration(nanos: f64) -> Duration {
    if nanos <= 0.0 {
        Duration::ZERO
    } else if nanos < u64::MAX as f64 {
        Duration::from_nanos(nanos.round() as u64)
    } else {
        Duration::from_secs_f64(nanos / 1e9)
    }
}
