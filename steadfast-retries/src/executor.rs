//! Retry executor for running operations with retries.

use crate::error::Cancelled;
use crate::failure::Classify;
use crate::logging::{GiveUpReason, RetryEvent, RetryLogger, TracingLogger};
use crate::policy::RetryPolicy;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Drives the bounded attempt loop for one policy.
///
/// The executor keeps no state between calls: every `execute*` call owns its
/// own attempt counter, so a single executor can be shared freely across
/// tasks.
///
/// # Example
///
/// ```ignore
/// use steadfast_retries::{Failure, RetryExecutor, RetryPolicy};
///
/// let executor = RetryExecutor::new(RetryPolicy::default_api());
/// let body = executor
///     .execute("fetch profile", || async { fetch_profile().await })
///     .await?;
/// ```
#[derive(Clone)]
pub struct RetryExecutor {
    policy: Arc<RetryPolicy>,
    logger: Arc<dyn RetryLogger>,
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Decision {
    Retry(Duration),
    GiveUp(GiveUpReason),
}

/// Cancellation wiring for one call.
struct Cancellation<'a, E> {
    token: &'a CancellationToken,
    error: fn() -> E,
}

fn cancelled_error<E: From<Cancelled>>() -> E {
    E::from(Cancelled)
}

impl RetryExecutor {
    /// Create an executor that logs through `tracing`.
    pub fn new(policy: impl Into<Arc<RetryPolicy>>) -> Self {
        Self::with_logger(policy, TracingLogger)
    }

    /// Create an executor with a custom logging sink.
    pub fn with_logger(
        policy: impl Into<Arc<RetryPolicy>>,
        logger: impl RetryLogger + 'static,
    ) -> Self {
        Self {
            policy: policy.into(),
            logger: Arc::new(logger),
        }
    }

    /// Executor using [`RetryPolicy::default_api`].
    pub fn for_api() -> Self {
        Self::new(RetryPolicy::default_api())
    }

    /// Executor using [`RetryPolicy::default_ui`].
    pub fn for_ui() -> Self {
        Self::new(RetryPolicy::default_ui())
    }

    /// The policy this executor applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Shared handle to the policy.
    pub fn shared_policy(&self) -> Arc<RetryPolicy> {
        Arc::clone(&self.policy)
    }

    /// Run async work that produces a value.
    ///
    /// Returns the first success, or the caller's own failure unchanged once
    /// it is not retryable or the attempt budget is spent.
    pub async fn execute<F, Fut, T, E>(&self, operation: &str, work: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + fmt::Display,
    {
        self.run(operation, work, |e: &E| self.policy.should_retry(e), None)
            .await
    }

    /// Run async work that produces no value.
    pub async fn execute_unit<F, Fut, E>(&self, operation: &str, work: F) -> Result<(), E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Classify + fmt::Display,
    {
        self.run(operation, work, |e: &E| self.policy.should_retry(e), None)
            .await
    }

    /// Run a synchronous function that produces a value.
    ///
    /// The function is called inline; delays between attempts still use the
    /// async timer so other tasks are not blocked.
    pub async fn execute_sync<F, T, E>(&self, operation: &str, mut work: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Classify + fmt::Display,
    {
        self.run(
            operation,
            || std::future::ready(work()),
            |e: &E| self.policy.should_retry(e),
            None,
        )
        .await
    }

    /// Run a synchronous action that produces no value.
    pub async fn execute_sync_unit<F, E>(&self, operation: &str, mut work: F) -> Result<(), E>
    where
        F: FnMut() -> Result<(), E>,
        E: Classify + fmt::Display,
    {
        self.run(
            operation,
            || std::future::ready(work()),
            |e: &E| self.policy.should_retry(e),
            None,
        )
        .await
    }

    /// Run async work that can be cancelled.
    ///
    /// The token is checked before each attempt and raced against both the
    /// work and the delay. On cancellation the in-flight attempt is dropped
    /// and `E::from(Cancelled)` is returned without further attempts.
    pub async fn execute_with_cancel<F, Fut, T, E>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        work: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + fmt::Display + From<Cancelled>,
    {
        self.execute_classified_with_cancel(
            operation,
            cancel,
            |e: &E| self.policy.should_retry(e),
            work,
        )
        .await
    }

    /// Run async work, deciding retryability with `retryable` instead of
    /// [`RetryPolicy::should_retry`].
    ///
    /// For adapters that already hold a verdict the kind walk cannot see,
    /// such as an HTTP status checked with [`RetryPolicy::should_retry_status`].
    /// The attempt budget, delays and events still come from the policy.
    pub async fn execute_classified<F, Fut, T, E, R>(
        &self,
        operation: &str,
        retryable: R,
        work: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        R: Fn(&E) -> bool,
    {
        self.run(operation, work, retryable, None).await
    }

    /// [`execute_classified`](Self::execute_classified) with cancellation.
    pub async fn execute_classified_with_cancel<F, Fut, T, E, R>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        retryable: R,
        work: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display + From<Cancelled>,
        R: Fn(&E) -> bool,
    {
        let cancellation = Cancellation {
            token: cancel,
            error: cancelled_error::<E>,
        };
        self.run(operation, work, retryable, Some(cancellation))
            .await
    }

    async fn run<F, Fut, T, E, R>(
        &self,
        operation: &str,
        mut work: F,
        retryable: R,
        cancel: Option<Cancellation<'_, E>>,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        R: Fn(&E) -> bool,
    {
        let max_attempts = self.policy.max_attempts().saturating_add(1);
        let mut attempt: u32 = 0;

        loop {
            if let Some(c) = &cancel {
                if c.token.is_cancelled() {
                    return Err(self.give_up_cancelled(operation, attempt + 1, c));
                }
            }

            self.logger.log(&RetryEvent::AttemptStarted {
                operation: operation.to_string(),
                attempt: attempt + 1,
                max_attempts,
            });

            let result = match &cancel {
                Some(c) => tokio::select! {
                    biased;
                    () = c.token.cancelled() => {
                        return Err(self.give_up_cancelled(operation, attempt + 1, c));
                    }
                    result = work() => result,
                },
                None => work().await,
            };

            let failure = match result {
                Ok(value) => {
                    if attempt > 0 {
                        self.logger.log(&RetryEvent::Succeeded {
                            operation: operation.to_string(),
                            attempt: attempt + 1,
                        });
                    }
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            match self.decide(attempt, retryable(&failure)) {
                Decision::GiveUp(reason) => {
                    self.logger.log(&RetryEvent::GaveUp {
                        operation: operation.to_string(),
                        attempt: attempt + 1,
                        reason,
                        error: failure.to_string(),
                    });
                    return Err(failure);
                }
                Decision::Retry(delay) => {
                    self.logger.log(&RetryEvent::Retrying {
                        operation: operation.to_string(),
                        attempt: attempt + 1,
                        delay,
                        error: failure.to_string(),
                    });

                    match &cancel {
                        Some(c) => tokio::select! {
                            biased;
                            () = c.token.cancelled() => {
                                return Err(self.give_up_cancelled(operation, attempt + 1, c));
                            }
                            () = sleep(delay) => {}
                        },
                        None => sleep(delay).await,
                    }

                    attempt += 1;
                }
            }
        }
    }

    /// Turn a failed attempt (0-based) and its retryability into a decision.
    fn decide(&self, attempt: u32, retryable: bool) -> Decision {
        if !retryable {
            Decision::GiveUp(GiveUpReason::NotRetryable)
        } else if attempt >= self.policy.max_attempts() {
            Decision::GiveUp(GiveUpReason::Exhausted)
        } else {
            Decision::Retry(self.policy.calculate_delay(attempt))
        }
    }

    fn give_up_cancelled<E>(&self, operation: &str, attempt: u32, cancel: &Cancellation<'_, E>) -> E {
        self.logger.log(&RetryEvent::GaveUp {
            operation: operation.to_string(),
            attempt,
            reason: GiveUpReason::Cancelled,
            error: Cancelled.to_string(),
        });
        (cancel.error)()
    }
}

/// Run async work under `policy` with a one-off executor.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation: &str,
    work: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + fmt::Display,
{
    RetryExecutor::new(policy.clone()).execute(operation, work).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::{Failure, FailureKind};
    use crate::logging::RecordingLogger;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;
    use tracing::Level;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::custom(
            max_attempts,
            Duration::from_millis(1),
            [FailureKind::Timeout, FailureKind::ConnectionFailure],
        )
    }

    fn recording(policy: RetryPolicy) -> (RetryExecutor, RecordingLogger) {
        let logger = RecordingLogger::new();
        (RetryExecutor::with_logger(policy, logger.clone()), logger)
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let (executor, logger) = recording(fast_policy(3));
        let result = executor
            .execute("answer", || async { Ok::<_, Failure>(42) })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(logger.attempts("answer"), 1);
        // No success event on the first-try path.
        assert_eq!(logger.count_at(Level::INFO), 0);
    }

    #[tokio::test]
    async fn test_eventual_success() {
        let (executor, logger) = recording(fast_policy(3));
        let calls = AtomicU32::new(0);

        let result = executor
            .execute("flaky", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 1 {
                        Err(Failure::timeout("slow"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            logger.events(),
            vec![
                RetryEvent::AttemptStarted {
                    operation: "flaky".into(),
                    attempt: 1,
                    max_attempts: 4,
                },
                RetryEvent::Retrying {
                    operation: "flaky".into(),
                    attempt: 1,
                    delay: Duration::from_millis(1),
                    error: "timeout: slow".into(),
                },
                RetryEvent::AttemptStarted {
                    operation: "flaky".into(),
                    attempt: 2,
                    max_attempts: 4,
                },
                RetryEvent::Succeeded {
                    operation: "flaky".into(),
                    attempt: 2,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_exhausted_returns_last_failure() {
        let (executor, logger) = recording(fast_policy(2));
        let calls = AtomicU32::new(0);

        let result: Result<(), Failure> = executor
            .execute("always-down", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(Failure::connection(format!("refused #{n}"))) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.message(), "refused #2");
        assert_eq!(err.kind(), FailureKind::ConnectionFailure);

        assert_eq!(logger.attempts("always-down"), 3);
        assert_eq!(logger.count_at(Level::WARN), 2);
        assert_eq!(logger.count_at(Level::ERROR), 1);
        assert!(matches!(
            logger.events().last(),
            Some(RetryEvent::GaveUp {
                attempt: 3,
                reason: GiveUpReason::Exhausted,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_non_retryable_short_circuits() {
        let (executor, logger) = recording(fast_policy(5));
        let calls = AtomicU32::new(0);

        let result: Result<i32, Failure> = executor
            .execute("bad-request", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Failure::other("validation failed")) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Other);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(logger.count_at(Level::WARN), 0);
        assert!(matches!(
            logger.events().last(),
            Some(RetryEvent::GaveUp {
                attempt: 1,
                reason: GiveUpReason::NotRetryable,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_zero_retries() {
        let (executor, logger) = recording(fast_policy(0));
        let calls = AtomicU32::new(0);

        let result: Result<(), Failure> = executor
            .execute("once", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Failure::timeout("slow")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            logger.events().last(),
            Some(RetryEvent::GaveUp {
                reason: GiveUpReason::Exhausted,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_retries_on_nested_cause() {
        let (executor, _logger) = recording(fast_policy(1));
        let calls = AtomicU32::new(0);

        let result: Result<(), Failure> = executor
            .execute("wrapped", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Failure::other("query failed").caused_by(Failure::timeout("socket"))) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_predicate_drives_retries() {
        let policy = fast_policy(2)
            .to_builder()
            .predicate(|f: &dyn Classify| f.kind() == FailureKind::Other)
            .build()
            .unwrap();
        let (executor, _logger) = recording(policy);

        let calls = AtomicU32::new(0);
        let result: Result<(), Failure> = executor
            .execute("predicate-yes", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Failure::other("custom")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let calls = AtomicU32::new(0);
        let result: Result<(), Failure> = executor
            .execute("predicate-no", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Failure::timeout("built-in kind")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_unit() {
        let (executor, logger) = recording(fast_policy(2));
        let calls = AtomicU32::new(0);

        let result = executor
            .execute_unit("click", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(Failure::connection("reset"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(logger.attempts("click"), 2);
    }

    #[tokio::test]
    async fn test_execute_sync() {
        let (executor, logger) = recording(fast_policy(3));
        let mut calls = 0;

        let result = executor
            .execute_sync("parse", || {
                calls += 1;
                if calls < 3 {
                    Err(Failure::timeout("not ready"))
                } else {
                    Ok(calls * 10)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 30);
        assert_eq!(calls, 3);
        assert_eq!(logger.attempts("parse"), 3);
    }

    #[tokio::test]
    async fn test_execute_sync_unit() {
        let (executor, _logger) = recording(fast_policy(3));
        let mut calls = 0;

        let result = executor
            .execute_sync_unit("write", || {
                calls += 1;
                Err(Failure::invalid_operation("read-only"))
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), FailureKind::InvalidOperation);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_io_errors_classify() {
        let (executor, _logger) = recording(fast_policy(1));
        let calls = AtomicU32::new(0);

        let result: Result<(), std::io::Error> = executor
            .execute_sync("connect", || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "refused",
                ))
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::ConnectionRefused);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_delays_are_applied() {
        let policy = RetryPolicy::default_api();
        let (executor, logger) = recording(policy);
        let start = Instant::now();

        let result: Result<(), Failure> = executor
            .execute("backoff", || async { Err(Failure::timeout("slow")) })
            .await;

        assert!(result.is_err());
        let delays: Vec<_> = logger
            .events()
            .into_iter()
            .filter_map(|e| match e {
                RetryEvent::Retrying { delay, .. } => Some(delay),
                _ => None,
            })
            .collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(7));
        assert!(elapsed < Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delays_are_applied() {
        let (executor, logger) = recording(RetryPolicy::default_ui());
        let start = Instant::now();

        let result: Result<(), Failure> = executor
            .execute("ui", || async { Err(Failure::invalid_operation("stale element")) })
            .await;

        assert!(result.is_err());
        assert_eq!(logger.attempts("ui"), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_are_independent() {
        let (executor, logger) = recording(RetryPolicy::default_ui());
        let first = AtomicU32::new(0);
        let second = AtomicU32::new(0);
        let start = Instant::now();

        let (a, b) = tokio::join!(
            executor.execute("first", || {
                let n = first.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Failure::timeout("slow"))
                    } else {
                        Ok(1)
                    }
                }
            }),
            executor.execute("second", || {
                let n = second.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 1 {
                        Err(Failure::timeout("slow"))
                    } else {
                        Ok(2)
                    }
                }
            }),
        );

        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 2);
        assert_eq!(logger.attempts("first"), 3);
        assert_eq!(logger.attempts("second"), 2);
        // Delays overlap instead of serializing.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let (executor, logger) = recording(fast_policy(3));
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);

        let result: Result<(), Failure> = executor
            .execute_with_cancel("cancelled", &token, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), FailureKind::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(logger.attempts("cancelled"), 0);
        assert!(matches!(
            logger.events().last(),
            Some(RetryEvent::GaveUp {
                reason: GiveUpReason::Cancelled,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay() {
        let policy = RetryPolicy::custom(5, Duration::from_secs(60), [FailureKind::Timeout]);
        let (executor, logger) = recording(policy);
        let token = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                sleep(Duration::from_secs(1)).await;
                token.cancel();
            })
        };

        let start = Instant::now();
        let result: Result<(), Failure> = executor
            .execute_with_cancel("slow-retry", &token, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Failure::timeout("slow")) }
            })
            .await;
        canceller.await.unwrap();

        assert_eq!(result.unwrap_err().kind(), FailureKind::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(60));
        assert_eq!(logger.count_at(Level::ERROR), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_work() {
        let (executor, _logger) = recording(fast_policy(3));
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(10)).await;
                token.cancel();
            })
        };

        let result: Result<(), Failure> = executor
            .execute_with_cancel("hang", &token, || async {
                sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .await;
        canceller.await.unwrap();

        assert_eq!(result.unwrap_err().kind(), FailureKind::Cancelled);
    }

    #[tokio::test]
    async fn test_with_retry() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(2), "helper", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(Failure::timeout("slow"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn test_decide() {
        let executor = RetryExecutor::with_logger(fast_policy(2), crate::logging::NullLogger);

        assert_eq!(
            executor.decide(0, true),
            Decision::Retry(Duration::from_millis(1))
        );
        assert_eq!(
            executor.decide(2, true),
            Decision::GiveUp(GiveUpReason::Exhausted)
        );
        assert_eq!(
            executor.decide(0, false),
            Decision::GiveUp(GiveUpReason::NotRetryable)
        );
    }

    #[tokio::test]
    async fn test_classifier_replaces_kind_check() {
        // No retryable kinds at all: only the classifier can allow a retry.
        let policy = RetryPolicy::custom(2, Duration::ZERO, std::iter::empty());
        let (executor, logger) = recording(policy);
        let calls = AtomicU32::new(0);

        let result: Result<u32, Failure> = executor
            .execute_classified(
                "classified",
                |e: &Failure| e.message() == "try again",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(Failure::other("try again"))
                },
            )
            .await;

        assert_eq!(result.unwrap_err().message(), "try again");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(logger.attempts("classified"), 3);
        assert_eq!(logger.count_at(Level::WARN), 2);
    }

    #[tokio::test]
    async fn test_classifier_can_refuse_retryable_kind() {
        let (executor, _logger) = recording(fast_policy(3));
        let calls = AtomicU32::new(0);

        let result: Result<(), Failure> = executor
            .execute_classified(
                "refused",
                |_: &Failure| false,
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(Failure::timeout("slow"))
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_executor_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<RetryExecutor>();

        let policy = Arc::new(RetryPolicy::default_api());
        let a = RetryExecutor::new(Arc::clone(&policy));
        let b = RetryExecutor::new(Arc::clone(&policy));
        assert!(Arc::ptr_eq(&a.shared_policy(), &b.shared_policy()));
    }
}
