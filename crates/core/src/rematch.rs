use std::collections::HashSet;

use crate::room::{ConnectionId, Player};

/// Mutual re-ready handshake returning a finished match to play. The
/// match restarts only once every member has requested rematch; an
/// explicit match-ended teardown forecloses it.
#[derive(Debug, Default)]
pub struct RematchCoordinator {
    requested: HashSet<ConnectionId>,
}

impl RematchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, id: ConnectionId) -> bool {
        self.requested.insert(id)
    }

    pub fn has_requested(&self, id: ConnectionId) -> bool {
        self.requested.contains(&id)
    }

    pub fn request_count(&self) -> usize {
        self.requested.len()
    }

    pub fn all_requested(&self, members: &[Player]) -> bool {
        !members.is_empty()
            && members
                .iter()
                .all(|p| self.requested.contains(&p.connection_id))
    }

    pub fn remove(&mut self, id: ConnectionId) {
        self.requested.remove(&id);
    }

    pub fn clear(&mut self) {
        self.requested.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(ids: &[ConnectionId]) -> Vec<Player> {
        ids.iter().map(|&id| Player::new(id, format!("p{}", id))).collect()
    }

    #[test]
    fn test_restart_requires_all_members() {
        let roster = members(&[1, 2]);
        let mut rematch = RematchCoordinator::new();

        assert!(rematch.request(1));
        assert!(!rematch.all_requested(&roster));

        rematch.request(2);
        assert!(rematch.all_requested(&roster));
    }

    #[test]
    fn test_duplicate_request_is_idempotent() {
        let mut rematch = RematchCoordinator::new();
        assert!(rematch.request(1));
        assert!(!rematch.request(1));
        assert_eq!(rematch.request_count(), 1);
    }

    #[test]
    fn test_leaver_is_dropped_from_handshake() {
        let mut rematch = RematchCoordinator::new();
        rematch.request(1);
        rematch.request(2);
        rematch.remove(2);

        assert!(!rematch.has_requested(2));
        assert!(rematch.all_requested(&members(&[1])));
    }
}
