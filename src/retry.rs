//! Bounded fixed-delay retry for backend queries.
//!
//! A query counts as successful only when it returns without error AND its
//! result passes a readiness check. For document lists the check is
//! "at least one match": documents written moments earlier may not be
//! visible to queries yet, so an empty result is retried exactly like a
//! failed request. Keep that in mind before narrowing this to error-only
//! retries.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{BackendError, DocumentList};

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

/// Attempt budget and delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Every attempt failed or came back empty.
#[derive(Debug, Clone, Error)]
#[error("Max retries reached after {attempts} attempt(s)")]
pub struct RetryExhausted {
    pub attempts: u32,
    /// Error of the final attempt; `None` if it returned an empty result.
    #[source]
    pub last_error: Option<BackendError>,
}

/// Runs `query` until it yields a result accepted by `is_ready`.
///
/// Sleeps `policy.delay()` between attempts, never after the last one.
pub async fn retry_until<T, F, Fut, P>(
    policy: &RetryPolicy,
    is_ready: P,
    mut query: F,
) -> Result<T, RetryExhausted>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
    P: Fn(&T) -> bool,
{
    let attempts = policy.attempts();
    let mut last_error = None;

    for attempt in 1..=attempts {
        match query().await {
            Ok(result) if is_ready(&result) => return Ok(result),
            Ok(_) => {
                tracing::debug!("Attempt {} returned no results", attempt);
                last_error = None;
            }
            Err(e) => {
                tracing::warn!("Attempt {} failed: {}", attempt, e);
                last_error = Some(e);
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.delay()).await;
        }
    }

    Err(RetryExhausted {
        attempts,
        last_error,
    })
}

/// Retries a document query until it matches at least one document.
pub async fn retry_query<F, Fut>(
    policy: &RetryPolicy,
    query: F,
) -> Result<DocumentList, RetryExhausted>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<DocumentList, BackendError>>,
{
    retry_until(policy, |list: &DocumentList| list.total > 0, query).await
}
