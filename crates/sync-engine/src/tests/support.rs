//! In-memory collaborator fakes and fixtures

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use ledger_bridge::{KeypairSigner, LedgerError, LedgerRpc, WalletSigner};
use parking_lot::Mutex;
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use story_program::{BattleParticipant, BattleRoom, PlayerProfile};

use crate::config::SyncConfig;
use crate::events::EventBus;
use crate::executor::TransactionExecutor;
use crate::fee_payer::FeePayerResolver;
use crate::registry::OperationRegistry;

/// In-memory [`LedgerRpc`] with call counters and fault injection
pub struct MockLedger {
    pub accounts: DashMap<Pubkey, Account>,
    pub balances: DashMap<Pubkey, u64>,
    pub fetch_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub submitted: Mutex<Vec<Transaction>>,
    pub submit_error: Mutex<Option<LedgerError>>,
    pub fetch_delay: Mutex<Duration>,
    pub submit_delay: Mutex<Duration>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accounts: DashMap::new(),
            balances: DashMap::new(),
            fetch_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            submit_error: Mutex::new(None),
            fetch_delay: Mutex::new(Duration::ZERO),
            submit_delay: Mutex::new(Duration::from_millis(5)),
        })
    }

    pub fn fail_submissions_with(&self, err: LedgerError) {
        *self.submit_error.lock() = Some(err);
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock() = delay;
    }

    pub fn store_profile(&self, profile: &PlayerProfile) -> Pubkey {
        let (address, _) = PlayerProfile::derive_pda(&profile.authority);
        self.accounts.insert(address, account_with(borsh::to_vec(profile).unwrap()));
        address
    }

    pub fn store_room(&self, room: &BattleRoom) -> Pubkey {
        let (address, _) = BattleRoom::derive_pda(room.room_id);
        self.accounts.insert(address, account_with(borsh::to_vec(room).unwrap()));
        address
    }

    pub fn store_participant(&self, room: &Pubkey, authority: &Pubkey, hp: u16, max_hp: u16) -> Pubkey {
        let (address, bump) = BattleParticipant::derive_pda(room, authority);
        let participant = BattleParticipant {
            room: *room,
            authority: *authority,
            hp,
            max_hp,
            bump,
        };
        self.accounts
            .insert(address, account_with(borsh::to_vec(&participant).unwrap()));
        address
    }

    pub fn fund(&self, address: &Pubkey, lamports: u64) {
        self.balances.insert(*address, lamports);
    }

    /// Positions carried by the submitted UpdatePosition transactions, in
    /// submission order
    pub fn submitted_positions(&self) -> Vec<i64> {
        use story_program::StoryInstruction;
        self.submitted
            .lock()
            .iter()
            .filter_map(|tx| {
                let data = &tx.message.instructions.first()?.data;
                let ix: StoryInstruction = borsh::BorshDeserialize::try_from_slice(data).ok()?;
                match ix {
                    StoryInstruction::UpdatePosition { position_x } => Some(position_x),
                    _ => None,
                }
            })
            .collect()
    }
}

fn account_with(data: Vec<u8>) -> Account {
    Account {
        lamports: 1,
        data,
        owner: story_program::id(),
        executable: false,
        rent_epoch: 0,
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.accounts.get(address).map(|a| a.value().clone()))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        Ok(self.balances.get(address).map(|b| *b).unwrap_or(0))
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.submit_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.submit_error.lock().clone() {
            return Err(err);
        }
        self.submitted.lock().push(tx.clone());
        Ok(Signature::new_unique())
    }
}

/// Wallet that declines every signature request
pub struct DecliningWallet {
    pubkey: Pubkey,
}

impl DecliningWallet {
    pub fn new() -> Self {
        Self {
            pubkey: Pubkey::new_unique(),
        }
    }
}

#[async_trait]
impl WalletSigner for DecliningWallet {
    fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    async fn sign(
        &self,
        _instructions: &[Instruction],
        _payer: &Pubkey,
        _blockhash: Hash,
    ) -> Result<Transaction, LedgerError> {
        Err(LedgerError::SignerDeclined("user dismissed the prompt".into()))
    }
}

/// Test config: no settle delay, 1ms pacing, direct payment
pub fn test_config() -> SyncConfig {
    SyncConfig {
        settle_delay_ms: 0,
        position_interval_ms: 1,
        position_queue_capacity: 32,
        prefer_relayer: false,
        ..SyncConfig::default()
    }
}

/// Funded keypair-backed executor over the mock ledger
pub fn executor_over(
    ledger: Arc<MockLedger>,
    events: EventBus,
    config: SyncConfig,
) -> (Arc<TransactionExecutor>, Pubkey) {
    let wallet = KeypairSigner::new(Keypair::new());
    let actor = wallet.pubkey();
    ledger.fund(&actor, crate::MIN_PAYER_BALANCE_LAMPORTS * 10);

    let executor = Arc::new(TransactionExecutor::new(
        ledger,
        Arc::new(wallet),
        FeePayerResolver::direct(),
        Arc::new(OperationRegistry::new()),
        events,
        config,
    ));
    (executor, actor)
}
