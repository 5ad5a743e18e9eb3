//! Transaction executor
//!
//! Builds, submits, and confirms one ledger operation, wrapped by the
//! operation registry for per-key idempotency. Failures are classified into
//! the stable taxonomy exactly once, here.

use std::sync::Arc;
use std::time::Duration;

use ledger_bridge::{LedgerError, LedgerRpc, WalletSigner};
use solana_sdk::pubkey::Pubkey;

use crate::config::SyncConfig;
use crate::error::{ErrorKind, SubmissionResult};
use crate::events::{ClientEvent, EventBus};
use crate::fee_payer::FeePayerResolver;
use crate::operation::Operation;
use crate::registry::OperationRegistry;

/// Submits operations to the ledger with dedupe, fee-payer resolution, and
/// failure classification
pub struct TransactionExecutor {
    ledger: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn WalletSigner>,
    fee_payer: FeePayerResolver,
    registry: Arc<OperationRegistry>,
    events: EventBus,
    config: SyncConfig,
}

impl TransactionExecutor {
    /// Create an executor over the given collaborators
    pub fn new(
        ledger: Arc<dyn LedgerRpc>,
        wallet: Arc<dyn WalletSigner>,
        fee_payer: FeePayerResolver,
        registry: Arc<OperationRegistry>,
        events: EventBus,
        config: SyncConfig,
    ) -> Self {
        Self {
            ledger,
            wallet,
            fee_payer,
            registry,
            events,
            config,
        }
    }

    /// The wallet identity operations act as
    pub fn actor(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    /// Submit one operation.
    ///
    /// Concurrent submissions with the same derived key collapse onto a
    /// single ledger attempt; every caller observes the same terminal
    /// result. The `OperationSettled` event fires once per execution, not
    /// once per caller.
    pub async fn submit(self: &Arc<Self>, op: Operation) -> SubmissionResult {
        let key = op.key();
        let this = self.clone();
        let settled_key = key.clone();

        self.registry
            .execute(&key, async move {
                let result = this.submit_inner(&op).await;
                this.events.emit(ClientEvent::OperationSettled {
                    key: settled_key,
                    result: result.clone(),
                });
                result
            })
            .await
    }

    async fn submit_inner(&self, op: &Operation) -> SubmissionResult {
        // Preconditions fail fast, before any network submission
        if let Some(required) = op.precondition_account() {
            match self.ledger.fetch_account(&required).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return SubmissionResult::failed(
                        ErrorKind::PreconditionMissing,
                        format!("account {required} does not exist on the ledger yet"),
                    )
                }
                Err(e) => return self.classified(op, e).await,
            }
        }

        let decision = self
            .fee_payer
            .resolve(&op.actor, self.config.prefer_relayer)
            .await;

        // Balance floor applies to self-payment only; the relayer is
        // responsible for its own balance
        if !decision.uses_relayer {
            match self.ledger.get_balance(&decision.payer).await {
                Ok(balance) if balance < self.config.min_payer_balance_lamports => {
                    return SubmissionResult::failed(
                        ErrorKind::InsufficientFunds,
                        format!(
                            "balance {} below minimum {}",
                            balance, self.config.min_payer_balance_lamports
                        ),
                    )
                }
                Ok(_) => {}
                Err(e) => return self.classified(op, e).await,
            }
        }

        let instruction = op.build_instruction(&decision.payer);

        let blockhash = match decision.blockhash {
            Some(hash) => hash,
            None => match self.ledger.latest_blockhash().await {
                Ok(hash) => hash,
                Err(e) => return self.classified(op, e).await,
            },
        };

        let tx = match self
            .wallet
            .sign(&[instruction], &decision.payer, blockhash)
            .await
        {
            Ok(tx) => tx,
            Err(e) => return self.classified(op, e).await,
        };

        match self.ledger.send_and_confirm(&tx).await {
            Ok(signature) => {
                self.settle().await;
                tracing::info!(key = %op.key(), %signature, relayer = decision.uses_relayer, "operation confirmed");
                SubmissionResult::confirmed(signature)
            }
            Err(e) => self.classified(op, e).await,
        }
    }

    async fn classified(&self, op: &Operation, err: LedgerError) -> SubmissionResult {
        if matches!(err, LedgerError::AlreadyProcessed) {
            return self.recover_already_processed(op).await;
        }
        let kind = classify(&err);
        tracing::warn!(key = %op.key(), ?kind, error = %err, "operation failed");
        SubmissionResult::failed(kind, err.to_string())
    }

    /// Turn an ambiguous "already processed" submit error into an
    /// idempotent confirmation.
    ///
    /// The re-read runs after the settle delay so it observes
    /// post-propagation state; if the effect still is not visible the
    /// outcome is Unconfirmed, not a false failure.
    async fn recover_already_processed(&self, op: &Operation) -> SubmissionResult {
        self.settle().await;

        let affected = op.affected_account();
        match self.ledger.fetch_account(&affected).await {
            Ok(Some(account)) if op.effect_applied(&account) => {
                tracing::info!(key = %op.key(), "already processed, effect confirmed by re-read");
                SubmissionResult::recovered()
            }
            Ok(_) => SubmissionResult::failed(
                ErrorKind::Unconfirmed,
                "reported already processed but the effect is not visible",
            ),
            Err(e) => SubmissionResult::failed(ErrorKind::Unconfirmed, e.to_string()),
        }
    }

    async fn settle(&self) {
        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }
    }
}

/// Single classification site mapping boundary errors to the taxonomy
fn classify(err: &LedgerError) -> ErrorKind {
    match err {
        LedgerError::InsufficientFunds => ErrorKind::InsufficientFunds,
        LedgerError::BlockhashExpired => ErrorKind::NetworkCongestion,
        LedgerError::SignerDeclined(_) => ErrorKind::UserRejected,
        LedgerError::AccountNotFound(_) => ErrorKind::PreconditionMissing,
        LedgerError::AlreadyProcessed => ErrorKind::AlreadyProcessed,
        LedgerError::Rpc(msg) => {
            let lower = msg.to_lowercase();
            if lower.contains("insufficient") {
                ErrorKind::InsufficientFunds
            } else if lower.contains("blockhash") {
                ErrorKind::NetworkCongestion
            } else if lower.contains("seed") {
                ErrorKind::AccountMismatch
            } else if lower.contains("relayer") {
                ErrorKind::RelayerUnavailable
            } else {
                ErrorKind::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_maps_boundary_errors() {
        assert_eq!(
            classify(&LedgerError::BlockhashExpired),
            ErrorKind::NetworkCongestion
        );
        assert_eq!(
            classify(&LedgerError::SignerDeclined("user closed prompt".into())),
            ErrorKind::UserRejected
        );
        assert_eq!(
            classify(&LedgerError::Rpc("custom: seed constraint violated".into())),
            ErrorKind::AccountMismatch
        );
        assert_eq!(
            classify(&LedgerError::Rpc("insufficient funds for rent".into())),
            ErrorKind::InsufficientFunds
        );
        assert_eq!(
            classify(&LedgerError::Rpc("connection reset".into())),
            ErrorKind::Unknown
        );
    }
}
