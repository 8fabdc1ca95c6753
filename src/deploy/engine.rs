// ABOUTME: Engine bundling the object store, telemetry sink, and retry budgets.
// ABOUTME: Hosts the retried primitives (copy, write) shared by upload, activation, and rollback.

use bytes::Bytes;
use std::future::Future;

use super::retry::{RetryPolicies, RetryPolicy};
use crate::store::{ObjectStore, StoreError};
use crate::telemetry::Telemetry;

/// Entry point for every deployment operation against one backend.
///
/// Cheap to copy; it only borrows the store and telemetry sink.
pub struct Engine<'a, S: ?Sized> {
    pub(crate) store: &'a S,
    pub(crate) telemetry: &'a dyn Telemetry,
    pub(crate) retry: RetryPolicies,
}

impl<S: ?Sized> Clone for Engine<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for Engine<'_, S> {}

impl<S: ?Sized> std::fmt::Debug for Engine<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<'a, S: ObjectStore + ?Sized> Engine<'a, S> {
    /// Create an engine with the default retry budgets.
    pub fn new(store: &'a S, telemetry: &'a dyn Telemetry) -> Self {
        Self {
            store,
            telemetry,
            retry: RetryPolicies::default(),
        }
    }

    /// Replace the retry budgets.
    pub fn with_retry(mut self, retry: RetryPolicies) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn retry(&self) -> RetryPolicies {
        self.retry
    }

    /// Run a store operation under `policy`, capturing retried failures.
    pub(crate) async fn retried<T, F, Fut>(
        &self,
        policy: RetryPolicy,
        key: &str,
        op: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let telemetry = self.telemetry;
        policy
            .run(op, |attempt, e| {
                tracing::warn!(
                    "Attempt {}/{} on {} failed: {}",
                    attempt,
                    policy.retries + 1,
                    key,
                    e
                );
                telemetry.capture(e);
            })
            .await
    }

    /// Write `body` to `key` under the object retry budget.
    pub(crate) async fn write(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        let store = self.store;
        self.retried(self.retry.object, key, || {
            let body = body.clone();
            async move { store.put(key, body).await }
        })
        .await
    }

    /// Copy the object at `from` to `to` under the object retry budget.
    pub(crate) async fn alias(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let store = self.store;
        tracing::debug!("Aliasing {} -> {}", from, to);
        self.retried(self.retry.object, to, || async move {
            let body = store.get(from).await?;
            store.put(to, body).await
        })
        .await
    }
}
