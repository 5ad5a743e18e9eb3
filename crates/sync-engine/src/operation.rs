//! Ledger-mutating operations
//!
//! An [`Operation`] is one UI intent headed for the ledger. Its key is
//! derived deterministically from kind + actor + the mutation's defining
//! argument, so two intents with the same ledger effect collide on the same
//! key and dedupe in the registry.

use borsh::BorshDeserialize;
use chrono::{DateTime, Utc};
use solana_sdk::{account::Account, instruction::Instruction, pubkey::Pubkey};
use story_program::{instruction as story_ix, PlayerProfile};

/// What the operation mutates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Enter a chapter (creates the profile on first entry)
    StartChapter { chapter: u8 },
    /// Record the rounded world position
    UpdatePosition { position_x: i64 },
    /// Record a quiz score for a chapter
    SubmitQuiz { chapter: u8, score: u16 },
}

/// One intended ledger mutation
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    /// Wallet identity performing the mutation
    pub actor: Pubkey,
    /// When the UI issued the intent
    pub issued_at: DateTime<Utc>,
}

impl Operation {
    pub fn start_chapter(actor: Pubkey, chapter: u8) -> Self {
        Self::new(actor, OperationKind::StartChapter { chapter })
    }

    pub fn update_position(actor: Pubkey, position_x: i64) -> Self {
        Self::new(actor, OperationKind::UpdatePosition { position_x })
    }

    pub fn submit_quiz(actor: Pubkey, chapter: u8, score: u16) -> Self {
        Self::new(actor, OperationKind::SubmitQuiz { chapter, score })
    }

    fn new(actor: Pubkey, kind: OperationKind) -> Self {
        Self {
            kind,
            actor,
            issued_at: Utc::now(),
        }
    }

    /// Deduplication key: kind + actor + defining argument
    pub fn key(&self) -> String {
        match self.kind {
            OperationKind::StartChapter { chapter } => {
                format!("start_chapter:{}:{}", self.actor, chapter)
            }
            OperationKind::UpdatePosition { position_x } => {
                format!("update_position:{}:{}", self.actor, position_x)
            }
            OperationKind::SubmitQuiz { chapter, score } => {
                format!("submit_quiz:{}:{}:{}", self.actor, chapter, score)
            }
        }
    }

    /// Account that must already exist on the ledger, if any.
    ///
    /// Entering the first chapter is what creates the profile, so it has no
    /// precondition; everything else mutates an existing profile.
    pub fn precondition_account(&self) -> Option<Pubkey> {
        let needs_profile = match self.kind {
            OperationKind::StartChapter { chapter } => chapter > 1,
            OperationKind::UpdatePosition { .. } | OperationKind::SubmitQuiz { .. } => true,
        };
        needs_profile.then(|| PlayerProfile::derive_pda(&self.actor).0)
    }

    /// Account re-read by the already-processed recovery path
    pub fn affected_account(&self) -> Pubkey {
        PlayerProfile::derive_pda(&self.actor).0
    }

    /// Build the ledger instruction against the resolved fee payer
    pub fn build_instruction(&self, payer: &Pubkey) -> Instruction {
        match self.kind {
            OperationKind::StartChapter { chapter } => {
                story_ix::start_chapter(&self.actor, payer, chapter)
            }
            OperationKind::UpdatePosition { position_x } => {
                story_ix::update_position(&self.actor, payer, position_x)
            }
            OperationKind::SubmitQuiz { chapter, score } => {
                story_ix::submit_quiz(&self.actor, payer, chapter, score)
            }
        }
    }

    /// Whether a re-read account already reflects this operation's effect.
    ///
    /// Used to turn an ambiguous "already processed" submit error into an
    /// idempotent confirmation.
    pub fn effect_applied(&self, account: &Account) -> bool {
        let Ok(profile) = PlayerProfile::try_from_slice(&account.data) else {
            return false;
        };
        match self.kind {
            OperationKind::StartChapter { chapter } => profile.current_chapter >= chapter,
            OperationKind::UpdatePosition { position_x } => profile.position_x == position_x,
            OperationKind::SubmitQuiz { chapter, score } => {
                profile.last_quiz_chapter == chapter && profile.last_quiz_score >= score
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_intent_same_key() {
        let actor = Pubkey::new_unique();
        let a = Operation::update_position(actor, 120);
        let b = Operation::update_position(actor, 120);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_defining_argument_changes_key() {
        let actor = Pubkey::new_unique();
        assert_ne!(
            Operation::update_position(actor, 120).key(),
            Operation::update_position(actor, 121).key()
        );
        assert_ne!(
            Operation::submit_quiz(actor, 1, 80).key(),
            Operation::submit_quiz(actor, 2, 80).key()
        );
    }

    #[test]
    fn test_actor_changes_key() {
        let a = Operation::start_chapter(Pubkey::new_unique(), 1);
        let b = Operation::start_chapter(Pubkey::new_unique(), 1);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_first_chapter_has_no_precondition() {
        let actor = Pubkey::new_unique();
        assert!(Operation::start_chapter(actor, 1).precondition_account().is_none());
        assert!(Operation::start_chapter(actor, 2).precondition_account().is_some());
        assert!(Operation::update_position(actor, 5).precondition_account().is_some());
    }

    #[test]
    fn test_effect_applied_matches_defining_argument() {
        let actor = Pubkey::new_unique();
        let profile = PlayerProfile {
            authority: actor,
            current_chapter: 3,
            position_x: 77,
            last_quiz_chapter: 3,
            last_quiz_score: 85,
            ..Default::default()
        };
        let account = Account {
            lamports: 1,
            data: borsh::to_vec(&profile).unwrap(),
            owner: story_program::id(),
            executable: false,
            rent_epoch: 0,
        };

        assert!(Operation::update_position(actor, 77).effect_applied(&account));
        assert!(!Operation::update_position(actor, 78).effect_applied(&account));
        assert!(Operation::start_chapter(actor, 3).effect_applied(&account));
        assert!(!Operation::start_chapter(actor, 4).effect_applied(&account));
        assert!(Operation::submit_quiz(actor, 3, 85).effect_applied(&account));
        assert!(!Operation::submit_quiz(actor, 3, 90).effect_applied(&account));
    }
}
