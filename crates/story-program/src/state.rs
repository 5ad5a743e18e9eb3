//! Story Program State
//!
//! Account structures mirrored from the on-chain story program for
//! client-side deserialization.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::constants::*;

/// Per-player story progress - singleton per wallet
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default)]
pub struct PlayerProfile {
    /// Player wallet authority
    pub authority: Pubkey,
    /// Chapter the player is currently in
    pub current_chapter: u8,
    /// Highest chapter ever completed
    pub chapters_completed: u8,
    /// Last synced world position (rounded, world units)
    pub position_x: i64,
    /// Cumulative quiz score across all chapters
    pub total_score: u32,
    /// Chapter of the most recently recorded quiz
    pub last_quiz_chapter: u8,
    /// Score of the most recently recorded quiz
    pub last_quiz_score: u16,
    /// PDA bump seed
    pub bump: u8,
}

impl PlayerProfile {
    /// Account size: 32 + 1 + 1 + 8 + 4 + 1 + 2 + 1 = 50
    pub const LEN: usize = 32 + 1 + 1 + 8 + 4 + 1 + 2 + 1;

    /// Derive PDA for a player profile
    pub fn derive_pda(authority: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[PROFILE_SEED, authority.as_ref()], &crate::id())
    }
}

/// Battle room lifecycle
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoomStatus {
    /// Created by one player, waiting for an opponent
    #[default]
    Waiting,
    /// Both players present, questions being served
    InProgress,
    /// Terminal - a winner has been recorded
    Completed,
}

impl RoomStatus {
    /// Wire string used by the UI layer
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::InProgress => "in_progress",
            RoomStatus::Completed => "completed",
        }
    }

    /// True once the room can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomStatus::Completed)
    }
}

/// One two-party battle living on the ledger
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default)]
pub struct BattleRoom {
    /// Room identifier chosen at creation
    pub room_id: u64,
    /// Player who created the room
    pub creator: Pubkey,
    /// Player who joined (Pubkey::default() until someone joins)
    pub joiner: Pubkey,
    /// Index of the question currently being served
    pub current_question: u8,
    /// Creator's running score
    pub creator_score: u16,
    /// Joiner's running score
    pub joiner_score: u16,
    /// Winner authority (Pubkey::default() = undecided)
    pub winner: Pubkey,
    /// Room lifecycle status
    pub status: RoomStatus,
    /// PDA bump seed
    pub bump: u8,
}

impl BattleRoom {
    /// Account size: 8 + 32 + 32 + 1 + 2 + 2 + 32 + 1 + 1 = 111
    pub const LEN: usize = 8 + 32 + 32 + 1 + 2 + 2 + 32 + 1 + 1;

    /// Derive PDA for a battle room
    pub fn derive_pda(room_id: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[BATTLE_ROOM_SEED, &room_id.to_le_bytes()],
            &crate::id(),
        )
    }

    /// True once a winner has been recorded on the room itself
    pub fn has_winner(&self) -> bool {
        self.winner != Pubkey::default()
    }
}

/// Per-player HP within a battle room
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default)]
pub struct BattleParticipant {
    /// Room this participant belongs to
    pub room: Pubkey,
    /// Participant wallet authority
    pub authority: Pubkey,
    /// Current HP
    pub hp: u16,
    /// Maximum HP
    pub max_hp: u16,
    /// PDA bump seed
    pub bump: u8,
}

impl BattleParticipant {
    /// Account size: 32 + 32 + 2 + 2 + 1 = 69
    pub const LEN: usize = 32 + 32 + 2 + 2 + 1;

    /// Derive PDA for a battle participant
    pub fn derive_pda(room: &Pubkey, authority: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[BATTLE_PLAYER_SEED, room.as_ref(), authority.as_ref()],
            &crate::id(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_roundtrip() {
        let profile = PlayerProfile {
            authority: Pubkey::new_unique(),
            current_chapter: 3,
            chapters_completed: 2,
            position_x: 1540,
            total_score: 870,
            last_quiz_chapter: 2,
            last_quiz_score: 90,
            bump: 254,
        };

        let bytes = borsh::to_vec(&profile).unwrap();
        assert_eq!(bytes.len(), PlayerProfile::LEN);

        let decoded = PlayerProfile::try_from_slice(&bytes).unwrap();
        assert_eq!(decoded.current_chapter, 3);
        assert_eq!(decoded.position_x, 1540);
        assert_eq!(decoded.last_quiz_score, 90);
    }

    #[test]
    fn test_room_pda_is_stable() {
        let (a, bump_a) = BattleRoom::derive_pda(42);
        let (b, bump_b) = BattleRoom::derive_pda(42);
        assert_eq!(a, b);
        assert_eq!(bump_a, bump_b);

        let (other, _) = BattleRoom::derive_pda(43);
        assert_ne!(a, other);
    }

    #[test]
    fn test_room_winner_detection() {
        let mut room = BattleRoom::default();
        assert!(!room.has_winner());
        assert!(!room.status.is_terminal());

        room.winner = Pubkey::new_unique();
        room.status = RoomStatus::Completed;
        assert!(room.has_winner());
        assert!(room.status.is_terminal());
    }
}
