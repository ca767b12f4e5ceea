use serde::{Deserialize, Serialize};

pub type ConnectionId = u32;

/// Local read-model of a relay-owned player. Created on a join event,
/// destroyed on leave; the score field mirrors the last authoritative
/// roster broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub score: i64,
}

impl Player {
    pub fn new(connection_id: ConnectionId, display_name: impl Into<String>) -> Self {
        Self {
            connection_id,
            display_name: display_name.into(),
            score: 0,
        }
    }
}

/// Capacity-bounded group of players matched for one game instance.
/// Locked once capacity is reached; the start timestamp arrives with the
/// relay's all-ready broadcast.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: Option<String>,
    pub capacity: usize,
    members: Vec<Player>,
    pub start_timestamp: Option<u64>,
}

impl Room {
    pub fn new(capacity: usize) -> Self {
        Self {
            code: None,
            capacity,
            members: Vec::new(),
            start_timestamp: None,
        }
    }

    pub fn with_code(code: impl Into<String>, capacity: usize) -> Self {
        Self {
            code: Some(code.into()),
            capacity,
            members: Vec::new(),
            start_timestamp: None,
        }
    }

    pub fn is_code_based(&self) -> bool {
        self.code.is_some()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.iter().any(|p| p.connection_id == id)
    }

    pub fn add_member(&mut self, player: Player) -> Result<(), &'static str> {
        if self.is_full() {
            return Err("Room is full");
        }
        if self.contains(player.connection_id) {
            return Err("Already joined");
        }
        self.members.push(player);
        Ok(())
    }

    pub fn remove_member(&mut self, id: ConnectionId) -> bool {
        if let Some(pos) = self.members.iter().position(|p| p.connection_id == id) {
            self.members.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn member(&self, id: ConnectionId) -> Option<&Player> {
        self.members.iter().find(|p| p.connection_id == id)
    }

    pub fn member_mut(&mut self, id: ConnectionId) -> Option<&mut Player> {
        self.members.iter_mut().find(|p| p.connection_id == id)
    }

    pub fn members(&self) -> &[Player] {
        &self.members
    }

    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.members.iter_mut()
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|p| p.connection_id).collect()
    }

    pub fn set_start(&mut self, timestamp_ms: u64) {
        self.start_timestamp = Some(timestamp_ms);
    }

    pub fn clear_start(&mut self) {
        self.start_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_capacity_lock() {
        let mut room = Room::new(2);
        assert!(room.add_member(Player::new(1, "alice")).is_ok());
        assert!(room.add_member(Player::new(2, "bob")).is_ok());
        assert!(room.is_full());
        assert_eq!(room.add_member(Player::new(3, "carol")), Err("Room is full"));
    }

    #[test]
    fn test_room_duplicate_join_rejected() {
        let mut room = Room::new(4);
        assert!(room.add_member(Player::new(1, "alice")).is_ok());
        assert_eq!(room.add_member(Player::new(1, "alice")), Err("Already joined"));
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_room_member_removal() {
        let mut room = Room::new(4);
        room.add_member(Player::new(1, "alice")).unwrap();
        room.add_member(Player::new(2, "bob")).unwrap();

        assert!(room.remove_member(1));
        assert!(!room.remove_member(1));
        assert_eq!(room.member_ids(), vec![2]);
    }

    #[test]
    fn test_code_based_room() {
        let room = Room::with_code("XKCD42", 2);
        assert!(room.is_code_based());
        assert_eq!(room.code.as_deref(), Some("XKCD42"));

        let random = Room::new(8);
        assert!(!random.is_code_based());
    }
}
