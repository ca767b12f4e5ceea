pub const COUNTDOWN_STEPS: u64 = 3;

/// Deadline derived from the relay's synchronized start timestamp.
/// Remaining time is recomputed from the wall clock on every read, never
/// decremented locally, so tab suspension or processing jitter
/// self-corrects on the next read without a resync message.
#[derive(Debug, Clone, Copy)]
pub struct MatchTimer {
    start_ms: u64,
    duration_ms: u64,
    grace_ms: u64,
}

impl MatchTimer {
    pub fn new(start_ms: u64, duration_ms: u64, grace_ms: u64) -> Self {
        Self {
            start_ms,
            duration_ms,
            grace_ms,
        }
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    /// `max(0, duration - (now - start) + grace)`.
    pub fn time_left_ms(&self, now_ms: u64) -> u64 {
        let remaining =
            self.duration_ms as i64 - (now_ms as i64 - self.start_ms as i64) + self.grace_ms as i64;
        remaining.max(0) as u64
    }

    pub fn started(&self, now_ms: u64) -> bool {
        now_ms >= self.start_ms
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        self.time_left_ms(now_ms) == 0
    }

    /// The 3-2-1 visual countdown, derived from the same timestamp.
    /// Returns None once the start moment has passed; never gates
    /// gameplay.
    pub fn countdown_value(&self, now_ms: u64) -> Option<u64> {
        if now_ms >= self.start_ms {
            return None;
        }
        let until_start = self.start_ms - now_ms;
        Some(until_start.div_ceil(1_000).min(COUNTDOWN_STEPS))
    }
}
