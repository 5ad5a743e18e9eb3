//! Ledger Bridge - external collaborators
//!
//! Handles communication with the outside world:
//! - Reading accounts and submitting transactions to the ledger RPC
//! - Querying the fee-sponsoring relayer service
//! - Signing through the wallet provider
//!
//! Every collaborator is an async trait so the sync engine can be tested
//! against in-memory fakes.

pub mod error;
pub mod ledger;
pub mod relayer;
pub mod wallet;

pub use error::LedgerError;
pub use ledger::{LedgerRpc, SolanaLedger};
pub use relayer::{HttpRelayer, RelayerApi};
pub use wallet::{KeypairSigner, WalletSigner};
