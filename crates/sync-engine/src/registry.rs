//! Operation registry - at-most-one-in-flight execution per key
//!
//! A process-wide (but explicitly injected, never a hidden singleton) table
//! from operation key to the in-flight shared result. A second submission
//! with a key that is already pending attaches to the first submission's
//! eventual result instead of starting a new one; this is what makes UI
//! double-taps and retry-after-timeout idempotent.

use std::future::Future;

use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use crate::error::SubmissionResult;

type SharedResult = Shared<BoxFuture<'static, SubmissionResult>>;

/// Table of in-flight operations keyed by derived operation key
#[derive(Default)]
pub struct OperationRegistry {
    in_flight: DashMap<String, SharedResult>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            in_flight: DashMap::new(),
        }
    }

    /// Run `fut` under `key`, or attach to the execution already running
    /// under that key.
    ///
    /// The entry is evicted once the execution settles (success or failure),
    /// so a later call with the same key is free to retry. When a caller
    /// attaches to an existing entry its own future is dropped unpolled and
    /// never runs.
    pub async fn execute<F>(&self, key: &str, fut: F) -> SubmissionResult
    where
        F: Future<Output = SubmissionResult> + Send + 'static,
    {
        use dashmap::mapref::entry::Entry;

        let (shared, owner) = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(key, "operation already in flight, attaching");
                (entry.get().clone(), false)
            }
            Entry::Vacant(entry) => {
                let shared = fut.boxed().shared();
                entry.insert(shared.clone());
                (shared, true)
            }
        };

        let result = shared.await;

        // Only the inserting caller evicts; an attacher removing by key
        // could race with a newer execution inserted after settle.
        if owner {
            self.in_flight.remove(key);
        }

        result
    }

    /// Number of operations currently in flight
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Check if nothing is in flight
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}
