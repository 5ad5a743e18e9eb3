//! Ledger RPC collaborator
//!
//! Read accounts, check balances, fetch blockhashes, and submit signed
//! transactions against the remote ledger.

use async_trait::async_trait;
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction, transaction::TransactionError,
};

use crate::error::LedgerError;

/// Async read/write surface of the ledger consumed by the sync engine
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch an account wholesale, `None` if it does not exist yet
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError>;

    /// Current lamport balance of an account (0 if missing)
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError>;

    /// A recent blockhash usable for signing
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Submit a signed transaction and wait for confirmation
    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, LedgerError>;
}

/// Production [`LedgerRpc`] over a Solana JSON-RPC endpoint
pub struct SolanaLedger {
    rpc: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaLedger {
    /// Connect with confirmed commitment
    pub fn new(rpc_url: &str) -> Self {
        Self::with_commitment(rpc_url, CommitmentConfig::confirmed())
    }

    /// Connect with an explicit commitment level
    pub fn with_commitment(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.to_string(), commitment),
            commitment,
        }
    }

    /// Get the RPC URL
    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }

    fn map_error(err: ClientError) -> LedgerError {
        if let Some(tx_err) = err.get_transaction_error() {
            match tx_err {
                TransactionError::AlreadyProcessed => return LedgerError::AlreadyProcessed,
                TransactionError::BlockhashNotFound => return LedgerError::BlockhashExpired,
                TransactionError::InsufficientFundsForFee => {
                    return LedgerError::InsufficientFunds
                }
                _ => {}
            }
        }

        // Some RPC providers only surface these as message text
        let msg = err.to_string();
        if msg.contains("already been processed") {
            LedgerError::AlreadyProcessed
        } else if msg.contains("Blockhash not found") {
            LedgerError::BlockhashExpired
        } else {
            LedgerError::Rpc(msg)
        }
    }
}

#[async_trait]
impl LedgerRpc for SolanaLedger {
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(Self::map_error)?;
        Ok(response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        self.rpc.get_balance(address).await.map_err(Self::map_error)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.rpc
            .get_latest_blockhash()
            .await
            .map_err(Self::map_error)
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, LedgerError> {
        let signature = self
            .rpc
            .send_and_confirm_transaction(tx)
            .await
            .map_err(Self::map_error)?;

        tracing::debug!(%signature, "transaction confirmed");
        Ok(signature)
    }
}
