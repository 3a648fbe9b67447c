//! Exponential backoff for idempotent backend reads.
//!
//! Only GETs go through here (weather, news, saved locations, plan history).
//! Timeouts, connection failures, 5xx, 408 and 429 are retried; every other
//! 4xx, including 401/403, is returned immediately.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, 200, 2000)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Delay before retry number `attempt` (0-based), capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as u64))
    }

    /// Run `send` until it yields a final outcome or the attempts run out.
    ///
    /// A retryable status on the last attempt is returned as the response so
    /// the caller can surface the server's error body.
    pub async fn run<F, Fut>(&self, send: F) -> Result<Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        loop {
            let outcome = send().await;
            let exhausted = attempt >= self.max_retries;

            match outcome {
                Ok(response) if !exhausted && is_retryable_status(response.status()) => {
                    tracing::warn!(
                        status = %response.status(),
                        attempt = attempt + 1,
                        "Retryable status from backend"
                    );
                }
                Err(e) if !exhausted && is_retryable_error(&e) => {
                    tracing::warn!(attempt = attempt + 1, "Retryable request error: {}", e);
                }
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!("Request settled after {} retries", attempt);
                    }
                    return Ok(response);
                }
                Err(e) => return Err(e),
            }

            let delay = self.delay_for_attempt(attempt);
            attempt += 1;
            tracing::debug!("Retry {} of {} in {:?}", attempt, self.max_retries, delay);
            tokio::time::sleep(delay).await;
        }
    }
}

/// Transport failures worth another attempt.
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    error.status().map_or(false, is_retryable_status)
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}
