//! Wallet collaborator
//!
//! Signing is async because a real wallet provider may prompt the user; a
//! declined prompt surfaces as [`LedgerError::SignerDeclined`].

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};

use crate::error::LedgerError;

/// Async signing surface consumed by the transaction executor
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The wallet's own public key (the actor identity)
    fn pubkey(&self) -> Pubkey;

    /// Sign the instructions into a transaction against the given payer.
    ///
    /// When the payer is not the wallet itself (relayer-sponsored), the
    /// returned transaction is partially signed; the sponsoring side
    /// countersigns during submission.
    async fn sign(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        blockhash: Hash,
    ) -> Result<Transaction, LedgerError>;
}

/// [`WalletSigner`] backed by a local keypair
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    /// Wrap a loaded keypair
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl WalletSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        blockhash: Hash,
    ) -> Result<Transaction, LedgerError> {
        let message = Message::new(instructions, Some(payer));
        let mut tx = Transaction::new_unsigned(message);
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| LedgerError::SignerDeclined(e.to_string()))?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_self_paid_transaction_is_fully_signed() {
        let signer = KeypairSigner::new(Keypair::new());
        let actor = signer.pubkey();

        let ix = story_like_instruction(&actor);
        let tx = signer.sign(&[ix], &actor, Hash::new_unique()).await.unwrap();
        assert!(tx.is_signed());
    }

    #[tokio::test]
    async fn test_sponsored_transaction_is_partially_signed() {
        let signer = KeypairSigner::new(Keypair::new());
        let actor = signer.pubkey();
        let sponsor = Pubkey::new_unique();

        let ix = story_like_instruction(&actor);
        let tx = signer
            .sign(&[ix], &sponsor, Hash::new_unique())
            .await
            .unwrap();

        // the sponsor's slot stays empty until it countersigns
        assert!(!tx.is_signed());
        assert_eq!(tx.message.account_keys[0], sponsor);
    }

    fn story_like_instruction(actor: &Pubkey) -> Instruction {
        use solana_sdk::instruction::AccountMeta;
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[0],
            vec![AccountMeta::new_readonly(*actor, true)],
        )
    }
}
