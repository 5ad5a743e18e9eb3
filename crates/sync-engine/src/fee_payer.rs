//! Fee payer resolution
//!
//! Decides, per submission attempt, whether the sponsoring relayer or the
//! player's own wallet pays network fees. Relayer health and blockhash
//! freshness are attempt-scoped, so nothing here is cached.

use std::sync::Arc;

use ledger_bridge::RelayerApi;
use solana_sdk::{hash::Hash, pubkey::Pubkey};

/// Outcome of one fee-payer resolution attempt
#[derive(Debug, Clone)]
pub struct FeePayerDecision {
    /// Account that pays the network fee
    pub payer: Pubkey,
    /// Whether the payer is the sponsoring relayer
    pub uses_relayer: bool,
    /// Blockhash supplied by the relayer; `None` means the executor fetches
    /// one itself
    pub blockhash: Option<Hash>,
}

/// Resolves who pays fees for a given operation attempt
pub struct FeePayerResolver {
    relayer: Option<Arc<dyn RelayerApi>>,
}

impl FeePayerResolver {
    /// Resolver with an optional relayer collaborator
    pub fn new(relayer: Option<Arc<dyn RelayerApi>>) -> Self {
        Self { relayer }
    }

    /// Resolver that always selects direct self-payment
    pub fn direct() -> Self {
        Self { relayer: None }
    }

    /// Decide the payer for this attempt.
    ///
    /// Relayer path: health probe, then payer address and blockhash fetched
    /// concurrently. Any failure falls back to direct self-payment - the
    /// relayer being down is never fatal to the operation.
    pub async fn resolve(&self, actor: &Pubkey, prefer_relayer: bool) -> FeePayerDecision {
        let relayer = match &self.relayer {
            Some(relayer) if prefer_relayer => relayer,
            _ => return Self::self_paid(actor),
        };

        if !relayer.check_health().await {
            tracing::warn!("relayer unhealthy, falling back to direct payment");
            return Self::self_paid(actor);
        }

        match tokio::try_join!(relayer.payer_address(), relayer.latest_blockhash()) {
            Ok((payer, blockhash)) => FeePayerDecision {
                payer,
                uses_relayer: true,
                blockhash: Some(blockhash),
            },
            Err(e) => {
                tracing::warn!(error = %e, "relayer fetch failed, falling back to direct payment");
                Self::self_paid(actor)
            }
        }
    }

    fn self_paid(actor: &Pubkey) -> FeePayerDecision {
        FeePayerDecision {
            payer: *actor,
            uses_relayer: false,
            blockhash: None,
        }
    }
}
