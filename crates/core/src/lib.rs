pub mod chain;
pub mod mode;
pub mod phase;
pub mod protocol;
pub mod rank;
pub mod ready;
pub mod rematch;
pub mod reward;
pub mod room;
pub mod score;
pub mod session;
pub mod timer;

pub use chain::{ChainChallenge, ChainOutcome, ChainPhase, RouletteWheel};
pub use mode::{AnswerTier, ModeConfig};
pub use phase::MatchPhase;
pub use protocol::{
    CodecError, DeltaReason, Frame, FrameHeader, FramePayload, GameType, RelayCommand, RelayEvent,
    RosterEntry, MAX_CHAT_LEN,
};
pub use rank::{bonus_for, rank_scores, RankEntry};
pub use ready::{clamp_handicap, ReadinessCoordinator, HANDICAP_MAX, HANDICAP_STEP};
pub use rematch::RematchCoordinator;
pub use reward::{
    AccountError, AccountEvent, AccountStore, AwardState, EventBus, IdentityError,
    IdentityProvider, LevelChange, LogError, LogKind, LogRow, MemoryStore, PendingAward,
    PendingStore, RewardContext, RewardLog, RewardPipeline, StoreError, UserId,
};
pub use room::{ConnectionId, Player, Room};
pub use score::{ScoreDelta, ScoreLedger, VisualDelta, PENALTY_CAP, PENALTY_STREAK};
pub use session::{ChatLine, MatchSession, MatchSummary, SessionConfig, SummaryEntry};
pub use timer::MatchTimer;
