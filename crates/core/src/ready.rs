use std::collections::HashMap;

use crate::room::{ConnectionId, Player};

pub const HANDICAP_MAX: u32 = 10_000;
pub const HANDICAP_STEP: u32 = 100;

/// Clamp a negotiated handicap to [0, 10000] and round it to the nearest
/// 100. Only meaningful in code-based rooms.
pub fn clamp_handicap(raw: i64) -> u32 {
    let clamped = raw.clamp(0, HANDICAP_MAX as i64) as u32;
    let rounded = (clamped + HANDICAP_STEP / 2) / HANDICAP_STEP * HANDICAP_STEP;
    rounded.min(HANDICAP_MAX)
}

/// All-ready handshake gating match start. The relay broadcasts one
/// synchronized start timestamp once every current member has signaled;
/// this tracker mirrors that roster-complete condition locally.
#[derive(Debug, Default)]
pub struct ReadinessCoordinator {
    ready: HashMap<ConnectionId, Option<u32>>,
}

impl ReadinessCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&mut self, id: ConnectionId, handicap: Option<u32>) {
        self.ready.insert(id, handicap);
    }

    pub fn is_ready(&self, id: ConnectionId) -> bool {
        self.ready.contains_key(&id)
    }

    pub fn handicap(&self, id: ConnectionId) -> Option<u32> {
        self.ready.get(&id).copied().flatten()
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// True only when every current room member has signaled ready.
    pub fn all_ready(&self, members: &[Player]) -> bool {
        !members.is_empty() && members.iter().all(|p| self.is_ready(p.connection_id))
    }

    pub fn remove(&mut self, id: ConnectionId) {
        self.ready.remove(&id);
    }

    pub fn clear(&mut self) {
        self.ready.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(ids: &[ConnectionId]) -> Vec<Player> {
        ids.iter().map(|&id| Player::new(id, format!("p{}", id))).collect()
    }

    #[test]
    fn test_handicap_clamp_and_round() {
        assert_eq!(clamp_handicap(-500), 0);
        assert_eq!(clamp_handicap(0), 0);
        assert_eq!(clamp_handicap(49), 0);
        assert_eq!(clamp_handicap(50), 100);
        assert_eq!(clamp_handicap(149), 100);
        assert_eq!(clamp_handicap(150), 200);
        assert_eq!(clamp_handicap(9_999), 10_000);
        assert_eq!(clamp_handicap(25_000), 10_000);
    }

    #[test]
    fn test_all_ready_requires_every_member() {
        let roster = members(&[1, 2, 3]);
        let mut ready = ReadinessCoordinator::new();

        ready.mark_ready(1, None);
        ready.mark_ready(2, Some(200));
        assert!(!ready.all_ready(&roster));

        ready.mark_ready(3, None);
        assert!(ready.all_ready(&roster));
    }

    #[test]
    fn test_late_joiner_resets_gate() {
        let mut ready = ReadinessCoordinator::new();
        ready.mark_ready(1, None);
        ready.mark_ready(2, None);
        assert!(ready.all_ready(&members(&[1, 2])));

        // A third member joining the room reopens the gate.
        assert!(!ready.all_ready(&members(&[1, 2, 3])));
    }

    #[test]
    fn test_empty_roster_is_never_ready() {
        let ready = ReadinessCoordinator::new();
        assert!(!ready.all_ready(&[]));
    }

    #[test]
    fn test_handicap_lookup() {
        let mut ready = ReadinessCoordinator::new();
        ready.mark_ready(7, Some(300));
        ready.mark_ready(8, None);

        assert_eq!(ready.handicap(7), Some(300));
        assert_eq!(ready.handicap(8), None);
        assert_eq!(ready.handicap(9), None);
    }
}
