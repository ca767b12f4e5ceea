use rkyv::{rancor, Archive, Deserialize, Serialize};

pub const PROTOCOL_MAGIC: u32 = 0x515A4D54;
pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_CHAT_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub enum GameType {
    Duel,
    BattleRoyale,
    ChainChallenge,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Duel => "duel",
            GameType::BattleRoyale => "battle_royale",
            GameType::ChainChallenge => "chain_challenge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub enum DeltaReason {
    Correct,
    Penalty,
}

/// One row of the relay's authoritative roster broadcast. The sole source
/// of truth for scores; local optimistic state yields to it on divergence.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct RosterEntry {
    pub connection_id: u32,
    pub display_name: String,
    pub score: i64,
}

/// Inbound events delivered by the relay to one session.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum RelayEvent {
    Joined {
        connection_id: u32,
        room_code: Option<String>,
        capacity: u32,
    },
    PeerJoined {
        connection_id: u32,
        display_name: String,
    },
    PeerLeft {
        connection_id: u32,
    },
    PeerReady {
        connection_id: u32,
        handicap: Option<u32>,
    },
    MatchStart {
        start_ms: u64,
        question_ids: Vec<u32>,
    },
    Roster {
        entries: Vec<RosterEntry>,
    },
    PeerDelta {
        connection_id: u32,
        amount: i64,
        reason: DeltaReason,
    },
    Chat {
        connection_id: u32,
        text: String,
    },
    RematchRequested {
        connection_id: u32,
    },
    RematchStart {
        start_ms: u64,
    },
    MatchEnded,
}

/// Outbound commands a session issues to the relay. All fire-and-forget;
/// no command awaits a server acknowledgement.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum RelayCommand {
    JoinRandom {
        capacity: u32,
        game_type: GameType,
    },
    JoinByCode {
        code: String,
        capacity: u32,
        game_type: GameType,
    },
    Ready {
        handicap: Option<u32>,
    },
    ScoreDelta {
        amount: i64,
        reason: DeltaReason,
    },
    Chat {
        text: String,
    },
    RematchRequest,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct FrameHeader {
    pub magic: u32,
    pub version: u32,
}

impl FrameHeader {
    pub fn new() -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum FramePayload {
    Event(RelayEvent),
    Command(RelayCommand),
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: FramePayload,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
    #[error("bad frame header")]
    BadHeader,
}

impl Frame {
    pub fn event(event: RelayEvent) -> Self {
        Self {
            header: FrameHeader::new(),
            payload: FramePayload::Event(event),
        }
    }

    pub fn command(command: RelayCommand) -> Self {
        Self {
            header: FrameHeader::new(),
            payload: FramePayload::Command(command),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, CodecError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(CodecError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, CodecError> {
        let frame =
            rkyv::from_bytes::<Self, rancor::Error>(data).map_err(CodecError::Deserialize)?;
        if !frame.header.is_valid() {
            return Err(CodecError::BadHeader);
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_round_trip() {
        let frame = Frame::command(RelayCommand::JoinRandom {
            capacity: 4,
            game_type: GameType::BattleRoyale,
        });

        let bytes = frame.serialize().unwrap();
        let decoded = Frame::deserialize(&bytes).unwrap();

        assert_eq!(frame.header, decoded.header);
        match decoded.payload {
            FramePayload::Command(RelayCommand::JoinRandom { capacity, game_type }) => {
                assert_eq!(capacity, 4);
                assert_eq!(game_type, GameType::BattleRoyale);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_bad_header_rejected() {
        let mut frame = Frame::event(RelayEvent::MatchEnded);
        frame.header.magic = 0xBAD;

        let bytes = frame.serialize().unwrap();
        assert!(matches!(
            Frame::deserialize(&bytes),
            Err(CodecError::BadHeader)
        ));
    }

    #[test]
    fn test_roster_event_round_trip() {
        let frame = Frame::event(RelayEvent::Roster {
            entries: vec![
                RosterEntry {
                    connection_id: 1,
                    display_name: "alice".to_string(),
                    score: 300,
                },
                RosterEntry {
                    connection_id: 2,
                    display_name: "bob".to_string(),
                    score: 150,
                },
            ],
        });

        let bytes = frame.serialize().unwrap();
        let decoded = Frame::deserialize(&bytes).unwrap();

        match decoded.payload {
            FramePayload::Event(RelayEvent::Roster { entries }) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].score, 300);
                assert_eq!(entries[1].display_name, "bob");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
