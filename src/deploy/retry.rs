// ABOUTME: Fixed-budget retry combinator for individual remote operations.
// ABOUTME: Reports each failed attempt through a hook and returns the last error unchanged.

use std::future::Future;
use std::time::Duration;

/// Retry budget for object writes and copies.
pub const OBJECT_RETRIES: u32 = 2;

/// Retry budget for the live pointer write.
pub const POINTER_RETRIES: u32 = 5;

/// Pause between attempts when none is configured.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// How often a single remote operation is retried.
///
/// `retries` counts attempts after the first, so an operation runs at most
/// `retries + 1` times. The pause between attempts is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Policy that retries without pausing.
    pub const fn immediate(retries: u32) -> Self {
        Self::new(retries, Duration::ZERO)
    }

    /// Run `op` until it succeeds or the budget is spent.
    ///
    /// `on_failure` sees every failed attempt that will be retried, with its
    /// 1-based attempt number. The final failure is returned, not reported.
    pub async fn run<T, E, F, Fut, H>(&self, mut op: F, mut on_failure: H) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: FnMut(u32, &E),
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt <= self.retries => {
                    on_failure(attempt, &e);
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// The two budgets the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicies {
    /// Uploads, file promotions, and aliases.
    pub object: RetryPolicy,
    /// The live pointer write; losing it desynchronizes what is served from
    /// what is recorded as live.
    pub pointer: RetryPolicy,
}

impl RetryPolicies {
    /// Default budgets with a custom pause.
    pub const fn with_delay(delay: Duration) -> Self {
        Self {
            object: RetryPolicy::new(OBJECT_RETRIES, delay),
            pointer: RetryPolicy::new(POINTER_RETRIES, delay),
        }
    }
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self::with_delay(DEFAULT_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let mut reported = Vec::new();

        let result: Result<&str, String> = RetryPolicy::immediate(2)
            .run(
                || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move {
                        if n < 3 {
                            Err(format!("attempt {n}"))
                        } else {
                            Ok("ok")
                        }
                    }
                },
                |attempt, e: &String| reported.push((attempt, e.clone())),
            )
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.get(), 3);
        assert_eq!(
            reported,
            vec![(1, "attempt 1".to_string()), (2, "attempt 2".to_string())]
        );
    }

    #[tokio::test]
    async fn exhausted_budget_returns_last_error_unreported() {
        let calls = Cell::new(0);
        let mut reported = 0;

        let result: Result<(), String> = RetryPolicy::immediate(5)
            .run(
                || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move { Err(format!("failure {n}")) }
                },
                |_, _| reported += 1,
            )
            .await;

        assert_eq!(result, Err("failure 6".to_string()));
        assert_eq!(calls.get(), 6);
        assert_eq!(reported, 5);
    }

    #[tokio::test]
    async fn zero_retries_runs_once() {
        let calls = Cell::new(0);
        let result: Result<(), &str> = RetryPolicy::immediate(0)
            .run(
                || {
                    calls.set(calls.get() + 1);
                    async { Err("nope") }
                },
                |_, _| panic!("no retry expected"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn default_budgets() {
        let policies = RetryPolicies::default();
        assert_eq!(policies.object.retries, 2);
        assert_eq!(policies.pointer.retries, 5);
    }
}
