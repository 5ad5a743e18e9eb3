//! Position sync queue
//!
//! Player position changes arrive on a fast sampling tick; ledger
//! submissions are slow and rate-sensitive. This queue serializes position
//! updates through the executor with a single paced worker: strict FIFO, at
//! most one drain worker alive, a fixed delay between items, and a bound
//! that coalesces to the newest sample under sustained movement.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::SyncConfig;
use crate::events::{ClientEvent, EventBus};
use crate::executor::TransactionExecutor;
use crate::operation::Operation;

struct QueueInner {
    queue: VecDeque<i64>,
    worker_active: bool,
    last_enqueued: Option<i64>,
}

/// Single-worker paced queue feeding position updates to the executor
pub struct PositionSyncQueue {
    executor: Arc<TransactionExecutor>,
    events: EventBus,
    inner: Mutex<QueueInner>,
    pacing: Duration,
    capacity: usize,
}

impl PositionSyncQueue {
    /// Create a queue over the executor
    pub fn new(executor: Arc<TransactionExecutor>, events: EventBus, config: &SyncConfig) -> Arc<Self> {
        Arc::new(Self {
            executor,
            events,
            inner: Mutex::new(QueueInner {
                queue: VecDeque::new(),
                worker_active: false,
                last_enqueued: None,
            }),
            pacing: Duration::from_millis(config.position_interval_ms),
            capacity: config.position_queue_capacity,
        })
    }

    /// Append a rounded position sample.
    ///
    /// Samples equal to the last enqueued value are dropped at the producer
    /// side. Starts the drain worker if none is active; while a worker is
    /// active this only grows the queue it is already draining.
    pub fn enqueue(self: &Arc<Self>, position_x: i64) {
        let start_worker = {
            let mut inner = self.inner.lock();

            if inner.last_enqueued == Some(position_x) {
                return;
            }
            inner.last_enqueued = Some(position_x);
            inner.queue.push_back(position_x);

            if inner.queue.len() > self.capacity {
                // Stale intermediate positions are worthless once superseded
                if let Some(newest) = inner.queue.pop_back() {
                    let dropped = inner.queue.len();
                    inner.queue.clear();
                    inner.queue.push_back(newest);
                    tracing::warn!(dropped, "position queue over capacity, coalesced to newest sample");
                }
            }

            if inner.worker_active {
                false
            } else {
                inner.worker_active = true;
                true
            }
        };

        if start_worker {
            let queue = self.clone();
            tokio::spawn(async move { queue.drain().await });
        }
    }

    /// Number of samples waiting to be submitted
    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Whether a drain worker is currently alive
    pub fn worker_active(&self) -> bool {
        self.inner.lock().worker_active
    }

    async fn drain(self: Arc<Self>) {
        loop {
            let next = {
                let mut inner = self.inner.lock();
                match inner.queue.pop_front() {
                    Some(position) => position,
                    None => {
                        inner.worker_active = false;
                        return;
                    }
                }
            };

            let op = Operation::update_position(self.executor.actor(), next);
            let result = self.executor.submit(op).await;

            if result.success {
                if let Some(signature) = result.signature {
                    self.events.emit(ClientEvent::PositionSynced {
                        position_x: next,
                        signature,
                    });
                }
                tracing::debug!(position = next, "position synced");
            } else {
                tracing::warn!(
                    position = next,
                    kind = ?result.error_kind,
                    "position sync failed, continuing with queue"
                );
            }

            tokio::time::sleep(self.pacing).await;
        }
    }
}
