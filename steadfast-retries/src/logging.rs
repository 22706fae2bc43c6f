//! Logging side channel for retry transitions.
//!
//! Every transition of the attempt loop produces a [`RetryEvent`] that is
//! handed to a [`RetryLogger`]. The default sink forwards to `tracing`;
//! [`RecordingLogger`] keeps events in memory for assertions.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn, Level};

/// Why the executor stopped retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveUpReason {
    /// The failure was classified as not transient.
    NotRetryable,
    /// Every allowed attempt failed.
    Exhausted,
    /// The caller cancelled the operation.
    Cancelled,
}

impl fmt::Display for GiveUpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GiveUpReason::NotRetryable => "not retryable",
            GiveUpReason::Exhausted => "attempts exhausted",
            GiveUpReason::Cancelled => "cancelled",
        })
    }
}

/// One transition of the attempt loop. Attempt numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryEvent {
    /// About to invoke the work.
    AttemptStarted {
        /// Operation name.
        operation: String,
        /// Attempt number.
        attempt: u32,
        /// Total invocations allowed.
        max_attempts: u32,
    },
    /// The attempt failed with a transient failure; waiting before the next.
    Retrying {
        /// Operation name.
        operation: String,
        /// Attempt number that failed.
        attempt: u32,
        /// Delay before the next attempt.
        delay: Duration,
        /// Rendered failure.
        error: String,
    },
    /// The work succeeded after at least one retry.
    Succeeded {
        /// Operation name.
        operation: String,
        /// Attempt number that succeeded.
        attempt: u32,
    },
    /// Final failure; the error is returned to the caller.
    GaveUp {
        /// Operation name.
        operation: String,
        /// Attempt number of the last failure.
        attempt: u32,
        /// Why retrying stopped.
        reason: GiveUpReason,
        /// Rendered failure.
        error: String,
    },
}

impl RetryEvent {
    /// Severity of this event.
    pub fn level(&self) -> Level {
        match self {
            RetryEvent::AttemptStarted { .. } => Level::DEBUG,
            RetryEvent::Succeeded { .. } => Level::INFO,
            RetryEvent::Retrying { .. } => Level::WARN,
            RetryEvent::GaveUp { .. } => Level::ERROR,
        }
    }

    /// Operation name the event belongs to.
    pub fn operation(&self) -> &str {
        match self {
            RetryEvent::AttemptStarted { operation, .. }
            | RetryEvent::Retrying { operation, .. }
            | RetryEvent::Succeeded { operation, .. }
            | RetryEvent::GaveUp { operation, .. } => operation,
        }
    }

    /// Attempt number the event belongs to.
    pub fn attempt(&self) -> u32 {
        match self {
            RetryEvent::AttemptStarted { attempt, .. }
            | RetryEvent::Retrying { attempt, .. }
            | RetryEvent::Succeeded { attempt, .. }
            | RetryEvent::GaveUp { attempt, .. } => *attempt,
        }
    }
}

/// Sink for retry events.
pub trait RetryLogger: Send + Sync {
    /// Record one event.
    fn log(&self, event: &RetryEvent);
}

/// Forwards events to `tracing` at the event's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RetryLogger for TracingLogger {
    fn log(&self, event: &RetryEvent) {
        match event {
            RetryEvent::AttemptStarted {
                operation,
                attempt,
                max_attempts,
            } => {
                debug!(
                    operation = %operation,
                    attempt,
                    max_attempts,
                    "Invoking attempt {attempt} of {operation}"
                );
            }
            RetryEvent::Retrying {
                operation,
                attempt,
                delay,
                error,
            } => {
                warn!(
                    operation = %operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Attempt {attempt} failed, retrying after {delay:?}"
                );
            }
            RetryEvent::Succeeded { operation, attempt } => {
                info!(
                    operation = %operation,
                    attempt,
                    "Operation succeeded after attempt {attempt}"
                );
            }
            RetryEvent::GaveUp {
                operation,
                attempt,
                reason,
                error,
            } => {
                error!(
                    operation = %operation,
                    attempt,
                    reason = %reason,
                    error = %error,
                    "Final failure after attempt {attempt}: {reason}"
                );
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl RetryLogger for NullLogger {
    fn log(&self, _event: &RetryEvent) {}
}

/// Keeps events in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<RetryEvent>>>,
}

impl RecordingLogger {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<RetryEvent> {
        self.events.lock().clone()
    }

    /// Events recorded for one operation.
    pub fn events_for(&self, operation: &str) -> Vec<RetryEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.operation() == operation)
            .cloned()
            .collect()
    }

    /// Number of attempts started for an operation.
    pub fn attempts(&self, operation: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| {
                matches!(e, RetryEvent::AttemptStarted { .. }) && e.operation() == operation
            })
            .count()
    }

    /// Number of events at the given level.
    pub fn count_at(&self, level: Level) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level() == level)
            .count()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl RetryLogger for RecordingLogger {
    fn log(&self, event: &RetryEvent) {
        self.events.lock().push(event.clone());
    }
}

impl<L: RetryLogger + ?Sized> RetryLogger for Arc<L> {
    fn log(&self, event: &RetryEvent) {
        (**self).log(event)
    }
}
