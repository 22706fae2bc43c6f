//! HTTP client with automatic retries.

use crate::error::{HttpError, HttpResult};
use reqwest::{Client, Method, Response};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use steadfast_retries::{CancellationToken, RetryExecutor, RetryLogger, RetryPolicy, TracingLogger};
use tracing::debug;

/// HTTP client wrapper with automatic retries.
///
/// Transport failures are classified by kind. Non-success responses are
/// checked against the policy's status codes: listed codes are retried,
/// anything else is returned on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryClient {
    client: Client,
    executor: RetryExecutor,
}

impl RetryClient {
    /// Create a new retry client with a default reqwest client.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_client(Client::new(), RetryExecutor::new(policy))
    }

    /// Create with a custom reqwest client and executor.
    pub fn with_client(client: Client, executor: RetryExecutor) -> Self {
        Self { client, executor }
    }

    /// Create with [`RetryPolicy::default_api`].
    pub fn for_api() -> Self {
        Self::new(RetryPolicy::default_api())
    }

    /// Start a builder.
    pub fn builder() -> RetryClientBuilder {
        RetryClientBuilder::new()
    }

    /// Get a reference to the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get a reference to the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }

    /// Execute a GET request with retries.
    pub async fn get(&self, url: &str) -> HttpResult<Response> {
        self.send(Method::GET, url, None::<&()>).await
    }

    /// Execute a POST request with retries.
    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> HttpResult<Response> {
        self.send(Method::POST, url, Some(body)).await
    }

    /// Execute a PUT request with retries.
    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> HttpResult<Response> {
        self.send(Method::PUT, url, Some(body)).await
    }

    /// Execute a PATCH request with retries.
    pub async fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> HttpResult<Response> {
        self.send(Method::PATCH, url, Some(body)).await
    }

    /// Execute a DELETE request with retries.
    pub async fn delete(&self, url: &str) -> HttpResult<Response> {
        self.send(Method::DELETE, url, None::<&()>).await
    }

    /// Execute a request with retries. The operation is logged as
    /// `"<METHOD> <url>"`.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> HttpResult<Response> {
        let operation = operation_name(&method, url);
        let policy = self.executor.policy();
        self.executor
            .execute_classified(
                &operation,
                |e: &HttpError| is_retryable(policy, e),
                || self.attempt(method.clone(), url, body),
            )
            .await
    }

    /// Execute a request with retries that stops when `cancel` fires.
    pub async fn send_with_cancel<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> HttpResult<Response> {
        let operation = operation_name(&method, url);
        let policy = self.executor.policy();
        self.executor
            .execute_classified_with_cancel(
                &operation,
                cancel,
                |e: &HttpError| is_retryable(policy, e),
                || self.attempt(method.clone(), url, body),
            )
            .await
    }

    /// One attempt: send, then turn error statuses into failures.
    async fn attempt<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> HttpResult<Response> {
        debug!(method = %method, url = %url, "Making HTTP request");

        let mut request = self.client.request(method, url);
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        check_response(response, self.executor.policy()).await
    }
}

fn operation_name(method: &Method, url: &str) -> String {
    format!("{method} {url}")
}

/// Status failures carry the status-code verdict; everything else goes
/// through the kind check.
fn is_retryable(policy: &RetryPolicy, error: &HttpError) -> bool {
    match error {
        HttpError::Status { transient, .. } => *transient,
        other => policy.should_retry(other),
    }
}

/// Pass successful responses through; classify the rest by status code.
async fn check_response(response: Response, policy: &RetryPolicy) -> HttpResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let transient = policy.should_retry_status(code);
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(status = code, error = %e, "Failed to read error response body");
            String::new()
        }
    };
    Err(HttpError::Status {
        status: code,
        body,
        transient,
    })
}

/// Builder for creating a retry client.
#[derive(Default)]
pub struct RetryClientBuilder {
    client: Option<Client>,
    policy: Option<RetryPolicy>,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn RetryLogger>>,
}

impl std::fmt::Debug for RetryClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryClientBuilder")
            .field("client", &self.client)
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl RetryClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the underlying HTTP client. Overrides [`timeout`](Self::timeout).
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the retry policy. Defaults to [`RetryPolicy::default_api`].
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the retry event sink. Defaults to `tracing`.
    pub fn logger(mut self, logger: impl RetryLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Build the retry client.
    pub fn build(self) -> HttpResult<RetryClient> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        let policy = self.policy.unwrap_or_default();
        let executor = match self.logger {
            Some(logger) => RetryExecutor::with_logger(policy, logger),
            None => RetryExecutor::with_logger(policy, TracingLogger),
        };

        Ok(RetryClient::with_client(client, executor))
    }
}
