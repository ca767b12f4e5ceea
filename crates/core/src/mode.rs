use crate::protocol::GameType;

/// Difficulty tier of one question; fixes the size of a correct-answer
/// delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerTier {
    Easy,
    Normal,
    Hard,
}

impl AnswerTier {
    pub fn points(&self) -> i64 {
        match self {
            AnswerTier::Easy => 100,
            AnswerTier::Normal => 200,
            AnswerTier::Hard => 300,
        }
    }
}

const DUEL_PLACEMENT: [i64; 1] = [50];
const ROYALE_PLACEMENT_4: [i64; 3] = [250, 125, 60];
const ROYALE_PLACEMENT_8: [i64; 7] = [600, 300, 150, 80, 40, 20, 10];

/// Per-mode business constants. The divisor/multiplier values differ
/// between modes on purpose; they are configuration data, not shared
/// formula parts.
#[derive(Debug, Clone)]
pub struct ModeConfig {
    pub game_type: GameType,
    pub capacity: usize,
    pub score_divisor: i64,
    pub exp_multiplier: i64,
    pub placement_table: &'static [i64],
    pub pending_slot: &'static str,
    pub match_duration_ms: u64,
    pub start_grace_ms: u64,
}

impl ModeConfig {
    /// 1v1. The placement table degenerates to a single win-bonus entry;
    /// a drawn rank 1 forfeits it for both players.
    pub fn duel() -> Self {
        Self {
            game_type: GameType::Duel,
            capacity: 2,
            score_divisor: 10,
            exp_multiplier: 2,
            placement_table: &DUEL_PLACEMENT,
            pending_slot: "pending_award.duel",
            match_duration_ms: 90_000,
            start_grace_ms: 1_000,
        }
    }

    pub fn battle_royale(capacity: usize) -> Self {
        let placement_table: &'static [i64] = if capacity > 4 {
            &ROYALE_PLACEMENT_8
        } else {
            &ROYALE_PLACEMENT_4
        };
        Self {
            game_type: GameType::BattleRoyale,
            capacity,
            score_divisor: 8,
            exp_multiplier: 3,
            placement_table,
            pending_slot: "pending_award.battle_royale",
            match_duration_ms: 120_000,
            start_grace_ms: 1_000,
        }
    }

    /// Single-player chain challenge; ranking and placement never apply.
    pub fn chain_challenge() -> Self {
        Self {
            game_type: GameType::ChainChallenge,
            capacity: 1,
            score_divisor: 20,
            exp_multiplier: 1,
            placement_table: &[],
            pending_slot: "pending_award.chain_challenge",
            match_duration_ms: 60_000,
            start_grace_ms: 1_000,
        }
    }

    pub fn for_game_type(game_type: GameType, capacity: usize) -> Self {
        match game_type {
            GameType::Duel => Self::duel(),
            GameType::BattleRoyale => Self::battle_royale(capacity),
            GameType::ChainChallenge => Self::chain_challenge(),
        }
    }
}
