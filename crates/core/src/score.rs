use std::collections::HashMap;

use crate::mode::AnswerTier;
use crate::protocol::{DeltaReason, RosterEntry};
use crate::room::ConnectionId;

pub const PENALTY_STREAK: u32 = 3;
pub const PENALTY_CAP: i64 = 100;
pub const VISUAL_TTL_MS: u64 = 1_500;

/// One optimistic score mutation, sent to the relay immediately and
/// superseded by the next authoritative roster broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDelta {
    pub player_id: ConnectionId,
    pub amount: i64,
    pub reason: DeltaReason,
}

/// Transient "±N" popup entry; expires after a fixed window.
#[derive(Debug, Clone, Copy)]
pub struct VisualDelta {
    pub player_id: ConnectionId,
    pub amount: i64,
    pub shown_at_ms: u64,
}

impl VisualDelta {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.shown_at_ms) > VISUAL_TTL_MS
    }
}

/// Optimistic local score state reconciled against the relay's roster
/// broadcasts. Local deltas are a latency hack; on any divergence the
/// broadcast wins.
#[derive(Debug, Default)]
pub struct ScoreLedger {
    scores: HashMap<ConnectionId, i64>,
    wrong_streaks: HashMap<ConnectionId, u32>,
    correct_answers: HashMap<ConnectionId, u32>,
    visuals: Vec<VisualDelta>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, id: ConnectionId) -> i64 {
        self.scores.get(&id).copied().unwrap_or(0)
    }

    pub fn correct_answers(&self, id: ConnectionId) -> u32 {
        self.correct_answers.get(&id).copied().unwrap_or(0)
    }

    pub fn wrong_streak(&self, id: ConnectionId) -> u32 {
        self.wrong_streaks.get(&id).copied().unwrap_or(0)
    }

    pub fn scores(&self) -> impl Iterator<Item = (ConnectionId, i64)> + '_ {
        self.scores.iter().map(|(&id, &score)| (id, score))
    }

    /// Apply a correct answer: positive tier-sized delta, streak reset.
    pub fn record_correct(
        &mut self,
        id: ConnectionId,
        tier: AnswerTier,
        now_ms: u64,
    ) -> ScoreDelta {
        let amount = tier.points();
        *self.scores.entry(id).or_insert(0) += amount;
        *self.correct_answers.entry(id).or_insert(0) += 1;
        self.wrong_streaks.insert(id, 0);
        self.push_visual(id, amount, now_ms);
        ScoreDelta {
            player_id: id,
            amount,
            reason: DeltaReason::Correct,
        }
    }

    /// Apply a wrong answer. The third consecutive miss triggers a
    /// penalty of `-min(100, current_score)` and resets the streak; the
    /// score never goes negative.
    pub fn record_wrong(&mut self, id: ConnectionId, now_ms: u64) -> Option<ScoreDelta> {
        let streak = self.wrong_streaks.entry(id).or_insert(0);
        *streak += 1;
        if *streak < PENALTY_STREAK {
            return None;
        }
        *streak = 0;

        let current = self.score(id);
        let amount = -PENALTY_CAP.min(current).max(0);
        if let Some(score) = self.scores.get_mut(&id) {
            *score += amount;
        }
        self.push_visual(id, amount, now_ms);
        Some(ScoreDelta {
            player_id: id,
            amount,
            reason: DeltaReason::Penalty,
        })
    }

    /// Optimistic mirror of a peer's delta, pending the next broadcast.
    pub fn apply_peer_delta(&mut self, id: ConnectionId, amount: i64, now_ms: u64) {
        let score = self.scores.entry(id).or_insert(0);
        *score = (*score + amount).max(0);
        self.push_visual(id, amount, now_ms);
    }

    /// Replace local state with the authoritative roster broadcast.
    /// Returns true when any local score diverged.
    pub fn reconcile(&mut self, entries: &[RosterEntry]) -> bool {
        let mut diverged = false;
        let mut next = HashMap::with_capacity(entries.len());
        for entry in entries {
            let local = self.score(entry.connection_id);
            if local != entry.score {
                diverged = true;
                log::warn!(
                    "score divergence for {}: local {} vs authoritative {}",
                    entry.connection_id,
                    local,
                    entry.score
                );
            }
            next.insert(entry.connection_id, entry.score);
        }
        self.scores = next;
        diverged
    }

    pub fn visuals(&self, now_ms: u64) -> impl Iterator<Item = &VisualDelta> {
        self.visuals.iter().filter(move |v| !v.is_expired(now_ms))
    }

    pub fn prune_visuals(&mut self, now_ms: u64) {
        self.visuals.retain(|v| !v.is_expired(now_ms));
    }

    pub fn reset(&mut self) {
        self.scores.clear();
        self.wrong_streaks.clear();
        self.correct_answers.clear();
        self.visuals.clear();
    }

    fn push_visual(&mut self, id: ConnectionId, amount: i64, now_ms: u64) {
        self.visuals.push(VisualDelta {
            player_id: id,
            amount,
            shown_at_ms: now_ms,
        });
    }
}
