//! Story Program - client-side model
//!
//! Account structures and instruction builders for the on-chain story
//! program. The program itself runs on the ledger; this crate mirrors its
//! layouts for deserialization and builds its instructions for submission.
//!
//! Account Structure:
//! - PlayerProfile: per-player chapter progress, position, quiz scores
//! - BattleRoom: one two-party battle (question index, scores, winner)
//! - BattleParticipant: per-player HP within a room

pub mod instruction;
pub mod state;

pub use instruction::StoryInstruction;
pub use state::{BattleParticipant, BattleRoom, PlayerProfile, RoomStatus};

// Story Program ID
// Note: base58 excludes: 0, I, O, l (lowercase L)
solana_sdk::declare_id!("StoryProgram1111111111111111111111111111111");

/// Constants
pub mod constants {
    /// Player profile PDA seed
    pub const PROFILE_SEED: &[u8] = b"profile";
    /// Battle room PDA seed
    pub const BATTLE_ROOM_SEED: &[u8] = b"battle_room";
    /// Battle participant PDA seed
    pub const BATTLE_PLAYER_SEED: &[u8] = b"battle_player";

    /// Default participant HP when a room is created
    pub const DEFAULT_BATTLE_HP: u16 = 100;
    /// Number of quiz questions per battle
    pub const QUESTIONS_PER_BATTLE: u8 = 10;
}
