use std::collections::{HashMap, HashSet};

use quizmatch::{DeltaReason, RelayCommand, RelayEvent, RosterEntry};

const START_LEAD_MS: u64 = 3_000;

/// In-process stand-in for the external relay/matchmaking service: one
/// room, seat-indexed members, authoritative score accumulation, and the
/// all-ready and all-rematch broadcasts. Events come back as
/// (seat, event) pairs for the caller to deliver.
pub struct LoopbackRelay {
    capacity: usize,
    question_count: u32,
    names: Vec<String>,
    ids: Vec<Option<u32>>,
    next_id: u32,
    ready: HashSet<u32>,
    rematch: HashSet<u32>,
    scores: HashMap<u32, i64>,
}

impl LoopbackRelay {
    pub fn new(capacity: usize, question_count: u32, names: Vec<String>) -> Self {
        let ids = vec![None; names.len()];
        Self {
            capacity,
            question_count,
            names,
            ids,
            next_id: 1,
            ready: HashSet::new(),
            rematch: HashSet::new(),
            scores: HashMap::new(),
        }
    }

    pub fn handle(
        &mut self,
        seat: usize,
        command: RelayCommand,
        now_ms: u64,
    ) -> Vec<(usize, RelayEvent)> {
        match command {
            RelayCommand::JoinRandom { .. } => self.join(seat, None),
            RelayCommand::JoinByCode { code, .. } => self.join(seat, Some(code)),
            RelayCommand::Ready { handicap } => self.mark_ready(seat, handicap, now_ms),
            RelayCommand::ScoreDelta { amount, reason } => self.score_delta(seat, amount, reason),
            RelayCommand::Chat { text } => self.chat(seat, text),
            RelayCommand::RematchRequest => self.request_rematch(seat, now_ms),
            RelayCommand::Leave => self.leave(seat),
        }
    }

    fn join(&mut self, seat: usize, code: Option<String>) -> Vec<(usize, RelayEvent)> {
        let id = self.next_id;
        self.next_id += 1;
        self.ids[seat] = Some(id);
        self.scores.insert(id, 0);

        let mut events = vec![(
            seat,
            RelayEvent::Joined {
                connection_id: id,
                room_code: code,
                capacity: self.capacity as u32,
            },
        )];
        for (other, other_id) in self.joined() {
            if other == seat {
                continue;
            }
            events.push((
                other,
                RelayEvent::PeerJoined {
                    connection_id: id,
                    display_name: self.names[seat].clone(),
                },
            ));
            events.push((
                seat,
                RelayEvent::PeerJoined {
                    connection_id: other_id,
                    display_name: self.names[other].clone(),
                },
            ));
        }
        events
    }

    fn mark_ready(
        &mut self,
        seat: usize,
        handicap: Option<u32>,
        now_ms: u64,
    ) -> Vec<(usize, RelayEvent)> {
        let Some(id) = self.ids[seat] else {
            return Vec::new();
        };
        self.ready.insert(id);

        let mut events: Vec<(usize, RelayEvent)> = self
            .others(seat)
            .map(|other| {
                (
                    other,
                    RelayEvent::PeerReady {
                        connection_id: id,
                        handicap,
                    },
                )
            })
            .collect();

        let joined: Vec<usize> = self.joined().map(|(seat, _)| seat).collect();
        if joined.len() == self.capacity && self.ready.len() == joined.len() {
            let start_ms = now_ms + START_LEAD_MS;
            let question_ids: Vec<u32> = (1..=self.question_count).collect();
            for seat in joined {
                events.push((
                    seat,
                    RelayEvent::MatchStart {
                        start_ms,
                        question_ids: question_ids.clone(),
                    },
                ));
            }
        }
        events
    }

    fn score_delta(
        &mut self,
        seat: usize,
        amount: i64,
        reason: DeltaReason,
    ) -> Vec<(usize, RelayEvent)> {
        let Some(id) = self.ids[seat] else {
            return Vec::new();
        };
        let score = self.scores.entry(id).or_insert(0);
        *score = (*score + amount).max(0);

        let mut events: Vec<(usize, RelayEvent)> = self
            .others(seat)
            .map(|other| {
                (
                    other,
                    RelayEvent::PeerDelta {
                        connection_id: id,
                        amount,
                        reason,
                    },
                )
            })
            .collect();

        // Every accepted delta is followed by an authoritative broadcast.
        let entries: Vec<RosterEntry> = self
            .joined()
            .map(|(seat, id)| RosterEntry {
                connection_id: id,
                display_name: self.names[seat].clone(),
                score: self.scores.get(&id).copied().unwrap_or(0),
            })
            .collect();
        for (seat, _) in self.joined() {
            events.push((
                seat,
                RelayEvent::Roster {
                    entries: entries.clone(),
                },
            ));
        }
        events
    }

    fn chat(&mut self, seat: usize, text: String) -> Vec<(usize, RelayEvent)> {
        let Some(id) = self.ids[seat] else {
            return Vec::new();
        };
        self.others(seat)
            .map(|other| {
                (
                    other,
                    RelayEvent::Chat {
                        connection_id: id,
                        text: text.clone(),
                    },
                )
            })
            .collect()
    }

    fn request_rematch(&mut self, seat: usize, now_ms: u64) -> Vec<(usize, RelayEvent)> {
        let Some(id) = self.ids[seat] else {
            return Vec::new();
        };
        self.rematch.insert(id);

        let mut events: Vec<(usize, RelayEvent)> = self
            .others(seat)
            .map(|other| (other, RelayEvent::RematchRequested { connection_id: id }))
            .collect();

        let joined: Vec<usize> = self.joined().map(|(seat, _)| seat).collect();
        if self.rematch.len() == joined.len() {
            self.rematch.clear();
            for score in self.scores.values_mut() {
                *score = 0;
            }
            let start_ms = now_ms + START_LEAD_MS;
            for seat in joined {
                events.push((seat, RelayEvent::RematchStart { start_ms }));
            }
        }
        events
    }

    fn leave(&mut self, seat: usize) -> Vec<(usize, RelayEvent)> {
        let Some(id) = self.ids[seat].take() else {
            return Vec::new();
        };
        self.ready.remove(&id);
        self.rematch.remove(&id);
        self.scores.remove(&id);
        self.others(seat)
            .map(|other| (other, RelayEvent::PeerLeft { connection_id: id }))
            .collect()
    }

    fn joined(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .filter_map(|(seat, id)| id.map(|id| (seat, id)))
    }

    fn others(&self, seat: usize) -> impl Iterator<Item = usize> + '_ {
        self.joined()
            .map(|(other, _)| other)
            .filter(move |&other| other != seat)
    }
}
