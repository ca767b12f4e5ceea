mod bus;
mod pending;
mod pipeline;

pub use bus::{AccountEvent, EventBus};
pub use pending::{
    read_pending, write_pending, MemoryStore, PendingAward, PendingStore, StoreError,
    PENDING_AWARD_VERSION,
};
pub use pipeline::{
    AccountError, AccountStore, AwardState, IdentityError, IdentityProvider, LevelChange, LogError,
    LogKind, LogRow, RewardContext, RewardLog, RewardPipeline, UserId,
};
