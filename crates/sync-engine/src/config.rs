//! Engine Configuration

use serde::{Deserialize, Serialize};

use crate::{
    MIN_PAYER_BALANCE_LAMPORTS, POSITION_QUEUE_CAPACITY, POSITION_SYNC_INTERVAL_MS,
    SETTLE_DELAY_MS,
};

/// Sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Minimum lamports a self-paying wallet must hold
    pub min_payer_balance_lamports: u64,
    /// Wait after confirmation before treating a result as durable
    pub settle_delay_ms: u64,
    /// Minimum delay between consecutive position submissions
    pub position_interval_ms: u64,
    /// Position queue bound; overflow coalesces to the newest sample
    pub position_queue_capacity: usize,
    /// Prefer the fee relayer over direct self-payment when available
    pub prefer_relayer: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_payer_balance_lamports: MIN_PAYER_BALANCE_LAMPORTS,
            settle_delay_ms: SETTLE_DELAY_MS,
            position_interval_ms: POSITION_SYNC_INTERVAL_MS,
            position_queue_capacity: POSITION_QUEUE_CAPACITY,
            prefer_relayer: true,
        }
    }
}
