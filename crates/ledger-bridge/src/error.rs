//! Boundary errors for ledger and wallet collaborators

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors surfaced by the ledger, relayer, and wallet collaborators.
///
/// These are transport-level facts; the sync engine maps them into its
/// user-facing taxonomy at one classification site.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("transaction already processed")]
    AlreadyProcessed,

    #[error("blockhash not found or expired")]
    BlockhashExpired,

    #[error("insufficient funds for fee")]
    InsufficientFunds,

    #[error("signer declined: {0}")]
    SignerDeclined(String),

    #[error("rpc error: {0}")]
    Rpc(String),
}
