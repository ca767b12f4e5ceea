use super::bus::{AccountEvent, EventBus};
use super::pending::{read_pending, write_pending, PendingAward, PendingStore};

pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub old_level: u32,
    pub new_level: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("session unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("account store unreachable: {0}")]
    Unreachable(String),
    #[error("increment rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("log append failed: {0}")]
    Append(String),
}

/// Identity/session provider. Both calls are fallible and are retried at
/// most once per award attempt.
pub trait IdentityProvider {
    fn current_identity(&mut self) -> Result<Option<UserId>, IdentityError>;
    fn refresh_session(&mut self) -> Result<(), IdentityError>;
}

/// Durable account store. The increment is atomic on the remote side and
/// is the sole point of truth for balances; the core never reads a
/// balance to write it back.
pub trait AccountStore {
    fn increment(
        &mut self,
        user: &UserId,
        points_delta: i64,
        exp_delta: i64,
    ) -> Result<LevelChange, AccountError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Points,
    Exp,
}

/// Append-only history row with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub kind: LogKind,
    pub amount: i64,
    pub reason: String,
}

pub trait RewardLog {
    fn append(&mut self, row: LogRow) -> Result<(), LogError>;
}

/// Where one award attempt currently stands. `NeedLogin` and `Error` are
/// both recoverable; `Awarded` is terminal and idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardState {
    Idle,
    NeedLogin,
    Error,
    Awarded,
}

/// Borrowed external collaborators for one pipeline call.
pub struct RewardContext<'a> {
    pub store: &'a mut dyn PendingStore,
    pub identity: &'a mut dyn IdentityProvider,
    pub accounts: &'a mut dyn AccountStore,
    pub log: &'a mut dyn RewardLog,
    pub bus: &'a EventBus,
}

/// Computes nothing itself; applies a precomputed award exactly once.
///
/// The correctness property lives in the ordering: the full payload is
/// persisted to the reload-surviving slot before any network attempt, the
/// remote call increments rather than sets, and the slot is cleared only
/// after the increment confirms. Every resumption trigger (page load,
/// visibility regained) re-reads the slot and re-attempts.
#[derive(Debug)]
pub struct RewardPipeline {
    slot_key: &'static str,
    state: AwardState,
    triggered: bool,
    awarded_once: bool,
}

impl RewardPipeline {
    pub fn new(slot_key: &'static str) -> Self {
        Self {
            slot_key,
            state: AwardState::Idle,
            triggered: false,
            awarded_once: false,
        }
    }

    pub fn state(&self) -> AwardState {
        self.state
    }

    pub fn slot_key(&self) -> &'static str {
        self.slot_key
    }

    /// Entry point for the finished-match transition. One-shot: repeated
    /// triggers from re-renders or duplicate events are ignored.
    pub fn trigger(&mut self, award: PendingAward, ctx: &mut RewardContext<'_>) -> AwardState {
        if self.triggered {
            return self.state;
        }
        self.triggered = true;

        if award.is_zero() {
            self.state = AwardState::Awarded;
            self.awarded_once = true;
            return self.state;
        }

        // Persist the intent before any network attempt so a reload that
        // interrupts the apply call finds the record on resumption.
        if let Err(err) = write_pending(ctx.store, self.slot_key, &award) {
            log::warn!("pending award not persisted: {}", err);
        }

        self.attempt(ctx)
    }

    /// Resumption entry point: page load or visibility regained. Re-reads
    /// the slot and re-attempts whatever is still pending.
    pub fn resume(&mut self, ctx: &mut RewardContext<'_>) -> AwardState {
        if self.state == AwardState::Awarded {
            return self.state;
        }
        self.attempt(ctx)
    }

    /// Clear all per-match pipeline state, including the pending slot.
    /// Used by the rematch reset; never by the award flow itself.
    pub fn reset(&mut self, store: &mut dyn PendingStore) {
        self.state = AwardState::Idle;
        self.triggered = false;
        self.awarded_once = false;
        if let Err(err) = store.delete(self.slot_key) {
            log::warn!("pending slot not cleared on reset: {}", err);
        }
    }

    fn attempt(&mut self, ctx: &mut RewardContext<'_>) -> AwardState {
        if self.awarded_once {
            return self.state;
        }

        let Some(award) = read_pending(ctx.store, self.slot_key) else {
            return self.state;
        };

        self.awarded_once = true;

        let user = match self.resolve_identity(ctx) {
            Ok(Some(user)) => user,
            Ok(None) => {
                // Not an error: leave the record on disk and wait for a
                // login. The flag is cleared so the next trigger retries.
                self.awarded_once = false;
                self.state = AwardState::NeedLogin;
                return self.state;
            }
            Err(err) => {
                log::warn!("identity resolution failed: {}", err);
                self.awarded_once = false;
                self.state = AwardState::NeedLogin;
                return self.state;
            }
        };

        match ctx.accounts.increment(&user, award.points, award.exp) {
            Ok(level) => {
                if let Err(err) = ctx.store.delete(self.slot_key) {
                    log::warn!("pending slot not cleared after award: {}", err);
                }
                self.announce(&award, level, ctx);
                self.state = AwardState::Awarded;
            }
            Err(err) => {
                log::warn!("reward apply failed, will retry on resumption: {}", err);
                self.awarded_once = false;
                self.state = AwardState::Error;
            }
        }
        self.state
    }

    fn resolve_identity(
        &self,
        ctx: &mut RewardContext<'_>,
    ) -> Result<Option<UserId>, IdentityError> {
        if let Some(user) = ctx.identity.current_identity()? {
            return Ok(Some(user));
        }
        ctx.identity.refresh_session()?;
        ctx.identity.current_identity()
    }

    fn announce(&self, award: &PendingAward, level: LevelChange, ctx: &mut RewardContext<'_>) {
        ctx.bus.publish(&AccountEvent::BalanceChanged {
            points_delta: award.points,
            exp_delta: award.exp,
        });
        if level.new_level != level.old_level {
            ctx.bus.publish(&AccountEvent::LevelChanged {
                old_level: level.old_level,
                new_level: level.new_level,
            });
        }

        // History rows are best-effort; a failed write never rolls back
        // the confirmed increment.
        let rows = [
            LogRow {
                kind: LogKind::Points,
                amount: award.points,
                reason: award.context.clone(),
            },
            LogRow {
                kind: LogKind::Exp,
                amount: award.exp,
                reason: award.context.clone(),
            },
        ];
        for row in rows {
            if let Err(err) = ctx.log.append(row) {
                log::warn!("reward log write failed: {}", err);
            }
        }
    }
}
