//! Battle state synchronizer
//!
//! Mirrors a two-party battle living on the ledger into local view state.
//! The ledger is polled (reads only, never through the executor), each
//! snapshot replaces the previous one wholesale, and the diff against the
//! prior local state drives phase transitions and completion. The caller
//! owns the poll timer; a `QuestionAdvanced` outcome is its cue to restart
//! the per-question countdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use borsh::BorshDeserialize;
use ledger_bridge::{LedgerError, LedgerRpc};
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use story_program::{BattleParticipant, BattleRoom};

use crate::events::{ClientEvent, EventBus};
use crate::{LEARNING_MAX_QUESTION, PRESSURE_MAX_QUESTION};

/// Placeholder HP held until a participant read actually resolves
pub const HP_UNSET: u16 = u16::MAX;

/// Battle difficulty phase, derived purely from the question index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Learning,
    Pressure,
    Deadly,
}

impl BattlePhase {
    /// Phase for a question index
    pub fn for_question(index: u8) -> Self {
        if index <= LEARNING_MAX_QUESTION {
            BattlePhase::Learning
        } else if index <= PRESSURE_MAX_QUESTION {
            BattlePhase::Pressure
        } else {
            BattlePhase::Deadly
        }
    }
}

/// Which side of the room the local player is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleRole {
    Creator,
    Joiner,
}

/// Immutable wholesale read of the on-ledger room
#[derive(Debug, Clone)]
pub struct BattleSnapshot {
    pub room_id: u64,
    pub creator: Pubkey,
    pub joiner: Pubkey,
    pub current_question: u8,
    pub creator_score: u16,
    pub joiner_score: u16,
    pub winner: Option<Pubkey>,
    pub raw_status: String,
}

impl From<&BattleRoom> for BattleSnapshot {
    fn from(room: &BattleRoom) -> Self {
        Self {
            room_id: room.room_id,
            creator: room.creator,
            joiner: room.joiner,
            current_question: room.current_question,
            creator_score: room.creator_score,
            joiner_score: room.joiner_score,
            winner: room.has_winner().then_some(room.winner),
            raw_status: room.status.as_str().to_string(),
        }
    }
}

impl BattleSnapshot {
    /// Terminal when a winner is recorded or the status says so
    pub fn is_complete(&self) -> bool {
        self.winner.is_some() || self.raw_status == "completed"
    }
}

/// Local mirror of the battle as the UI should render it
#[derive(Debug, Clone)]
pub struct BattleViewState {
    pub room_id: u64,
    pub role: BattleRole,
    pub phase: BattlePhase,
    pub current_question: u8,
    pub my_score: u16,
    pub opponent_score: u16,
    pub my_hp: u16,
    pub my_max_hp: u16,
    pub opponent_hp: u16,
    pub opponent_max_hp: u16,
    pub game_over: bool,
    pub winner_label: Option<String>,
    /// Whether the local player already answered the current question
    pub answered_current: bool,
}

impl BattleViewState {
    fn new(room_id: u64) -> Self {
        Self {
            room_id,
            role: BattleRole::Creator,
            phase: BattlePhase::Learning,
            current_question: 0,
            my_score: 0,
            opponent_score: 0,
            my_hp: HP_UNSET,
            my_max_hp: HP_UNSET,
            opponent_hp: HP_UNSET,
            opponent_max_hp: HP_UNSET,
            game_over: false,
            winner_label: None,
            answered_current: false,
        }
    }
}

/// What one poll observed
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Nothing new (also returned while another poll is outstanding or
    /// after the battle ended)
    NoChange,
    /// Scores/phase/HP refreshed within the same question
    Refreshed(BattleViewState),
    /// The room moved to a new question; per-question state was reset
    QuestionAdvanced(BattleViewState),
    /// Terminal; final state frozen
    Completed(BattleViewState),
}

/// Polls one battle room and reconciles it against local view state
pub struct BattleStateSynchronizer {
    ledger: Arc<dyn LedgerRpc>,
    events: EventBus,
    me: Pubkey,
    my_label: String,
    opponent_label: String,
    room_address: Pubkey,
    state: Mutex<BattleViewState>,
    poll_in_flight: AtomicBool,
}

impl BattleStateSynchronizer {
    /// Create a synchronizer for one room; view state starts at placeholder
    /// HP until the first participant reads resolve
    pub fn new(
        ledger: Arc<dyn LedgerRpc>,
        events: EventBus,
        me: Pubkey,
        my_label: impl Into<String>,
        opponent_label: impl Into<String>,
        room_id: u64,
    ) -> Self {
        let (room_address, _) = BattleRoom::derive_pda(room_id);
        Self {
            ledger,
            events,
            me,
            my_label: my_label.into(),
            opponent_label: opponent_label.into(),
            room_address,
            state: Mutex::new(BattleViewState::new(room_id)),
            poll_in_flight: AtomicBool::new(false),
        }
    }

    /// Current view state snapshot
    pub fn state(&self) -> BattleViewState {
        self.state.lock().clone()
    }

    /// Record that the local player answered the current question
    pub fn mark_answered(&self) {
        self.state.lock().answered_current = true;
    }

    /// Fetch the room and reconcile.
    ///
    /// Single-flight: a call arriving while another poll is outstanding is
    /// a no-op. Once the battle is over every call is a no-op; stopping is
    /// the caller ceasing to invoke this.
    pub async fn poll(&self) -> Result<PollOutcome, LedgerError> {
        if self.poll_in_flight.swap(true, Ordering::AcqRel) {
            return Ok(PollOutcome::NoChange);
        }
        let outcome = self.poll_inner().await;
        self.poll_in_flight.store(false, Ordering::Release);
        outcome
    }

    async fn poll_inner(&self) -> Result<PollOutcome, LedgerError> {
        if self.state.lock().game_over {
            return Ok(PollOutcome::NoChange);
        }

        let account = self
            .ledger
            .fetch_account(&self.room_address)
            .await?
            .ok_or(LedgerError::AccountNotFound(self.room_address))?;
        let room = BattleRoom::try_from_slice(&account.data)
            .map_err(|e| LedgerError::Rpc(format!("battle room decode failed: {e}")))?;
        let snapshot = BattleSnapshot::from(&room);

        let role = if snapshot.creator == self.me {
            BattleRole::Creator
        } else if snapshot.joiner == self.me {
            BattleRole::Joiner
        } else {
            tracing::warn!(room = %self.room_address, "fetched room names neither side as local player");
            return Ok(PollOutcome::NoChange);
        };
        let opponent = match role {
            BattleRole::Creator => snapshot.joiner,
            BattleRole::Joiner => snapshot.creator,
        };

        // Two independent reads; either may be unresolved this poll
        let (mine, theirs) = tokio::join!(
            self.fetch_participant(&self.me),
            self.fetch_participant(&opponent),
        );

        let mut state = self.state.lock();
        let prev_question = state.current_question;
        let prev_phase = state.phase;

        state.role = role;
        let (my_score, opponent_score) = match role {
            BattleRole::Creator => (snapshot.creator_score, snapshot.joiner_score),
            BattleRole::Joiner => (snapshot.joiner_score, snapshot.creator_score),
        };
        state.my_score = my_score;
        state.opponent_score = opponent_score;

        // Sticky sentinel: overwrite only when a fresh value actually
        // arrived, so one slow read never reverts HP to the placeholder
        if let Some(participant) = mine {
            state.my_hp = participant.hp;
            state.my_max_hp = participant.max_hp;
        }
        if let Some(participant) = theirs {
            state.opponent_hp = participant.hp;
            state.opponent_max_hp = participant.max_hp;
        }

        state.current_question = snapshot.current_question;
        state.phase = BattlePhase::for_question(snapshot.current_question);

        if snapshot.is_complete() {
            state.game_over = true;
            state.winner_label = snapshot.winner.map(|winner| {
                if winner == self.me {
                    self.my_label.clone()
                } else {
                    self.opponent_label.clone()
                }
            });
            let final_state = state.clone();
            drop(state);

            tracing::info!(
                room = snapshot.room_id,
                winner = ?final_state.winner_label,
                "battle completed"
            );
            self.events.emit(ClientEvent::BattleCompleted {
                state: final_state.clone(),
            });
            return Ok(PollOutcome::Completed(final_state));
        }

        let advanced = snapshot.current_question != prev_question;
        if advanced {
            state.answered_current = false;
        }
        let phase_changed = state.phase != prev_phase;
        let view = state.clone();
        drop(state);

        if phase_changed {
            tracing::debug!(room = snapshot.room_id, phase = ?view.phase, "battle phase changed");
            self.events.emit(ClientEvent::BattlePhaseChanged {
                state: view.clone(),
            });
        }

        Ok(if advanced {
            PollOutcome::QuestionAdvanced(view)
        } else {
            PollOutcome::Refreshed(view)
        })
    }

    async fn fetch_participant(&self, authority: &Pubkey) -> Option<BattleParticipant> {
        let (address, _) = BattleParticipant::derive_pda(&self.room_address, authority);
        match self.ledger.fetch_account(&address).await {
            Ok(Some(account)) => BattleParticipant::try_from_slice(&account.data).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(%address, error = %e, "participant read unresolved this poll");
                None
            }
        }
    }
}
