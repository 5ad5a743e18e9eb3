//! Sync Engine - client-side ledger coordination core
//!
//! This crate keeps local UI state consistent with the remote ledger:
//! - Deduplicated, idempotent submission of ledger mutations with dynamic
//!   fee-payer selection and a stable error taxonomy
//! - A bounded, paced, single-worker queue streaming player position
//! - A polling reconciliation state machine for two-party battles

pub mod battle;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod fee_payer;
pub mod operation;
pub mod position_queue;
pub mod registry;

#[cfg(test)]
mod tests;

pub use battle::{BattlePhase, BattleRole, BattleStateSynchronizer, BattleViewState, PollOutcome};
pub use config::SyncConfig;
pub use error::{ErrorKind, SubmissionResult};
pub use events::{ClientEvent, EventBus};
pub use executor::TransactionExecutor;
pub use fee_payer::{FeePayerDecision, FeePayerResolver};
pub use operation::{Operation, OperationKind};
pub use position_queue::PositionSyncQueue;
pub use registry::OperationRegistry;

/// Minimum lamports a self-paying wallet must hold before submission
pub const MIN_PAYER_BALANCE_LAMPORTS: u64 = 5_000_000;

/// Wait after confirmation before treating a result as durable (rollup propagation)
pub const SETTLE_DELAY_MS: u64 = 2_000;

/// Minimum delay between consecutive position submissions
pub const POSITION_SYNC_INTERVAL_MS: u64 = 2_000;

/// Position queue bound; overflow coalesces to the newest sample
pub const POSITION_QUEUE_CAPACITY: usize = 32;

/// Highest question index still in the Learning phase
pub const LEARNING_MAX_QUESTION: u8 = 2;

/// Highest question index still in the Pressure phase
pub const PRESSURE_MAX_QUESTION: u8 = 6;
