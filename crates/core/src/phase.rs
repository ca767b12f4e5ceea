use serde::{Deserialize, Serialize};

/// Lifecycle of one match session. Exactly one instance per session;
/// transitions are driven by relay events or explicit local action,
/// never inferred from timers alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    Searching,
    WaitingRoom,
    ReadyWait,
    Countdown,
    Playing,
    Finished,
    RematchWait,
}

impl MatchPhase {
    pub fn can_transition(self, next: MatchPhase) -> bool {
        use MatchPhase::*;
        matches!(
            (self, next),
            (Searching, WaitingRoom)
                | (WaitingRoom, ReadyWait)
                | (ReadyWait, Countdown)
                | (Countdown, Playing)
                | (Playing, Finished)
                | (Finished, RematchWait)
                | (RematchWait, Countdown)
                | (WaitingRoom, Searching)
                | (ReadyWait, Searching)
                | (Countdown, Searching)
                | (Playing, Searching)
                | (Finished, Searching)
                | (RematchWait, Searching)
        )
    }

    pub fn transition(&mut self, next: MatchPhase) -> Result<(), &'static str> {
        if self.can_transition(next) {
            *self = next;
            Ok(())
        } else {
            Err("Invalid phase transition")
        }
    }

    /// True once the session is attached to a room.
    pub fn in_room(self) -> bool {
        !matches!(self, MatchPhase::Searching)
    }

    pub fn is_live(self) -> bool {
        matches!(self, MatchPhase::Countdown | MatchPhase::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut phase = MatchPhase::Searching;
        for next in [
            MatchPhase::WaitingRoom,
            MatchPhase::ReadyWait,
            MatchPhase::Countdown,
            MatchPhase::Playing,
            MatchPhase::Finished,
            MatchPhase::RematchWait,
            MatchPhase::Countdown,
        ] {
            assert!(phase.transition(next).is_ok(), "{:?} -> {:?}", phase, next);
        }
        assert_eq!(phase, MatchPhase::Countdown);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut phase = MatchPhase::Searching;
        assert!(phase.transition(MatchPhase::Playing).is_err());
        assert!(phase.transition(MatchPhase::Finished).is_err());
        assert_eq!(phase, MatchPhase::Searching);

        let mut playing = MatchPhase::Playing;
        assert!(playing.transition(MatchPhase::RematchWait).is_err());
    }

    #[test]
    fn test_teardown_always_returns_to_searching() {
        for phase in [
            MatchPhase::WaitingRoom,
            MatchPhase::ReadyWait,
            MatchPhase::Countdown,
            MatchPhase::Playing,
            MatchPhase::Finished,
            MatchPhase::RematchWait,
        ] {
            let mut p = phase;
            assert!(p.transition(MatchPhase::Searching).is_ok());
        }
    }
}
