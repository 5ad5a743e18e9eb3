//! Story Program Instructions
//!
//! Instruction data layouts plus client-side builders. Builders return a
//! ready [`Instruction`] against the resolved fee payer; signing happens in
//! the wallet collaborator.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::state::PlayerProfile;

/// Story program instructions
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum StoryInstruction {
    /// Enter a chapter, creating the profile on first entry
    ///
    /// Accounts:
    /// 0. `[writable]` Player profile account (PDA)
    /// 1. `[signer]` Player authority (wallet)
    /// 2. `[signer, writable]` Payer
    /// 3. `[]` System program
    StartChapter {
        /// Chapter being entered (1-based)
        chapter: u8,
    },

    /// Record the player's rounded world position
    ///
    /// Accounts:
    /// 0. `[writable]` Player profile account (PDA)
    /// 1. `[signer]` Player authority (wallet)
    /// 2. `[signer, writable]` Payer
    UpdatePosition {
        /// Rounded world X position
        position_x: i64,
    },

    /// Record a quiz score for a chapter
    ///
    /// Accounts:
    /// 0. `[writable]` Player profile account (PDA)
    /// 1. `[signer]` Player authority (wallet)
    /// 2. `[signer, writable]` Payer
    SubmitQuiz {
        /// Chapter the quiz belongs to
        chapter: u8,
        /// Achieved score
        score: u16,
    },
}

/// Build a StartChapter instruction against the resolved payer
pub fn start_chapter(authority: &Pubkey, payer: &Pubkey, chapter: u8) -> Instruction {
    let (profile_pda, _) = PlayerProfile::derive_pda(authority);

    Instruction::new_with_borsh(
        crate::id(),
        &StoryInstruction::StartChapter { chapter },
        vec![
            AccountMeta::new(profile_pda, false),
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

/// Build an UpdatePosition instruction against the resolved payer
pub fn update_position(authority: &Pubkey, payer: &Pubkey, position_x: i64) -> Instruction {
    let (profile_pda, _) = PlayerProfile::derive_pda(authority);

    Instruction::new_with_borsh(
        crate::id(),
        &StoryInstruction::UpdatePosition { position_x },
        vec![
            AccountMeta::new(profile_pda, false),
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*payer, true),
        ],
    )
}

/// Build a SubmitQuiz instruction against the resolved payer
pub fn submit_quiz(authority: &Pubkey, payer: &Pubkey, chapter: u8, score: u16) -> Instruction {
    let (profile_pda, _) = PlayerProfile::derive_pda(authority);

    Instruction::new_with_borsh(
        crate::id(),
        &StoryInstruction::SubmitQuiz { chapter, score },
        vec![
            AccountMeta::new(profile_pda, false),
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*payer, true),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_position_builder() {
        let authority = Pubkey::new_unique();
        let payer = Pubkey::new_unique();

        let ix = update_position(&authority, &payer, -250);
        assert_eq!(ix.program_id, crate::id());

        let decoded = StoryInstruction::try_from_slice(&ix.data).unwrap();
        assert_eq!(decoded, StoryInstruction::UpdatePosition { position_x: -250 });

        // payer must sign and be writable
        let payer_meta = &ix.accounts[2];
        assert_eq!(payer_meta.pubkey, payer);
        assert!(payer_meta.is_signer);
        assert!(payer_meta.is_writable);
    }

    #[test]
    fn test_start_chapter_references_system_program() {
        let authority = Pubkey::new_unique();
        let ix = start_chapter(&authority, &authority, 1);
        assert_eq!(ix.accounts.len(), 4);
        assert_eq!(ix.accounts[3].pubkey, system_program::id());
    }
}
