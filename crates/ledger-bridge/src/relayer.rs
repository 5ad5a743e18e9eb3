//! Fee relayer collaborator
//!
//! The relayer is a third-party HTTP service willing to pay network fees on
//! a player's behalf. All calls are best-effort: any failure here makes the
//! resolver fall back to direct self-payment.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use solana_sdk::{hash::Hash, pubkey::Pubkey};

/// Async surface of the fee relayer consumed by the fee-payer resolver
#[async_trait]
pub trait RelayerApi: Send + Sync {
    /// Probe the relayer's health endpoint
    async fn check_health(&self) -> bool;

    /// Address of the relayer-controlled fee payer
    async fn payer_address(&self) -> Result<Pubkey>;

    /// Blockhash served by the relayer, consistent with its payer
    async fn latest_blockhash(&self) -> Result<Hash>;
}

#[derive(Deserialize)]
struct PayerResponse {
    address: String,
}

#[derive(Deserialize)]
struct BlockhashResponse {
    blockhash: String,
}

/// Production [`RelayerApi`] over the relayer's JSON HTTP endpoints
pub struct HttpRelayer {
    base: String,
    client: reqwest::Client,
}

impl HttpRelayer {
    /// Create a relayer client for the given base URL
    pub fn new(base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            base: base.into(),
            client,
        }
    }

    /// Get the relayer base URL
    pub fn base_url(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl RelayerApi for HttpRelayer {
    async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "relayer health check failed");
                false
            }
        }
    }

    async fn payer_address(&self) -> Result<Pubkey> {
        let url = format!("{}/payer", self.base);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let t = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("payer_address failed {} {}", status, t));
        }
        let body = resp.json::<PayerResponse>().await?;
        Ok(Pubkey::from_str(&body.address)?)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        let url = format!("{}/blockhash", self.base);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let t = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("latest_blockhash failed {} {}", status, t));
        }
        let body = resp.json::<BlockhashResponse>().await?;
        Ok(Hash::from_str(&body.blockhash)?)
    }
}
