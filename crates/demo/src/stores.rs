use quizmatch::{
    AccountError, AccountStore, IdentityError, IdentityProvider, LevelChange, LogError, LogRow,
    RewardLog, UserId,
};

pub struct DemoIdentity {
    pub user: UserId,
}

impl IdentityProvider for DemoIdentity {
    fn current_identity(&mut self) -> Result<Option<UserId>, IdentityError> {
        Ok(Some(self.user.clone()))
    }

    fn refresh_session(&mut self) -> Result<(), IdentityError> {
        Ok(())
    }
}

/// In-memory stand-in for the durable account service. Levels are a
/// simple function of accumulated experience.
#[derive(Default)]
pub struct DemoAccounts {
    pub points: i64,
    pub exp: i64,
    pub fail_remaining: u32,
}

impl DemoAccounts {
    fn level(exp: i64) -> u32 {
        (exp / 100) as u32 + 1
    }
}

impl AccountStore for DemoAccounts {
    fn increment(
        &mut self,
        user: &UserId,
        points_delta: i64,
        exp_delta: i64,
    ) -> Result<LevelChange, AccountError> {
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(AccountError::Unreachable("simulated outage".to_string()));
        }
        let old_level = Self::level(self.exp);
        self.points += points_delta;
        self.exp += exp_delta;
        let new_level = Self::level(self.exp);
        log::debug!("{}: +{} points, +{} exp", user, points_delta, exp_delta);
        Ok(LevelChange {
            old_level,
            new_level,
        })
    }
}

pub struct DemoLog;

impl RewardLog for DemoLog {
    fn append(&mut self, row: LogRow) -> Result<(), LogError> {
        log::info!("history row: {:?} {:+} ({})", row.kind, row.amount, row.reason);
        Ok(())
    }
}
