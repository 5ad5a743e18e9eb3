//! Events emitted to the UI layer
//!
//! The engine never calls back into the UI; it broadcasts state transitions
//! and the UI subscribes to the ones it renders. Sends with no subscribers
//! are ignored.

use solana_sdk::signature::Signature;
use tokio::sync::broadcast;

use crate::battle::BattleViewState;
use crate::error::SubmissionResult;

/// State transitions the UI can subscribe to
#[derive(Clone, Debug)]
pub enum ClientEvent {
    /// An operation reached its terminal result
    OperationSettled {
        key: String,
        result: SubmissionResult,
    },
    /// A position sample was confirmed on the ledger
    PositionSynced {
        position_x: i64,
        signature: Signature,
    },
    /// The battle moved into a different phase
    BattlePhaseChanged { state: BattleViewState },
    /// The battle reached its terminal state
    BattleCompleted { state: BattleViewState },
}

/// Broadcast bus carrying [`ClientEvent`] to UI subscribers
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create a bus with the given buffered capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Emit an event (ignore errors if no subscribers)
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
