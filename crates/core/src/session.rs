use std::collections::VecDeque;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::mode::{AnswerTier, ModeConfig};
use crate::phase::MatchPhase;
use crate::protocol::{GameType, RelayCommand, RelayEvent, MAX_CHAT_LEN};
use crate::rank::{bonus_for, rank_scores, RankEntry};
use crate::ready::{clamp_handicap, ReadinessCoordinator};
use crate::rematch::RematchCoordinator;
use crate::reward::{AwardState, PendingAward, RewardContext, RewardPipeline};
use crate::room::{ConnectionId, Player, Room};
use crate::score::ScoreLedger;
use crate::timer::MatchTimer;

pub const CHAT_HISTORY: usize = 32;

#[derive(Debug, Clone)]
pub struct ChatLine {
    pub connection_id: ConnectionId,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SummaryEntry {
    pub player_id: ConnectionId,
    pub display_name: String,
    pub score: i64,
    pub rank: usize,
    pub bonus: i64,
}

/// Final standings plus the local reward breakdown, emitted once on the
/// transition into `Finished` for any presentation layer.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub entries: Vec<SummaryEntry>,
    pub local_points: i64,
    pub local_exp: i64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub display_name: String,
    pub mode: ModeConfig,
    pub room_code: Option<String>,
}

/// One player's view of one match: a reducer over inbound relay events
/// plus explicit local actions. Commands flow out through a channel the
/// relay link drains; nothing here blocks or awaits an acknowledgement.
pub struct MatchSession {
    config: SessionConfig,
    phase: MatchPhase,
    room: Option<Room>,
    local_id: Option<ConnectionId>,
    ready: ReadinessCoordinator,
    ledger: ScoreLedger,
    rematch: RematchCoordinator,
    timer: Option<MatchTimer>,
    question_ids: Vec<u32>,
    answered: usize,
    pipeline: RewardPipeline,
    commands: UnboundedSender<RelayCommand>,
    chat: VecDeque<ChatLine>,
    summary: Option<MatchSummary>,
}

impl MatchSession {
    /// Create the session and issue the join command. The returned
    /// receiver is the relay link's outbound side.
    pub fn begin(config: SessionConfig) -> (Self, UnboundedReceiver<RelayCommand>) {
        let (commands, receiver) = unbounded_channel();
        let pipeline = RewardPipeline::new(config.mode.pending_slot);
        let mut session = Self {
            config,
            phase: MatchPhase::Searching,
            room: None,
            local_id: None,
            ready: ReadinessCoordinator::new(),
            ledger: ScoreLedger::new(),
            rematch: RematchCoordinator::new(),
            timer: None,
            question_ids: Vec::new(),
            answered: 0,
            pipeline,
            commands,
            chat: VecDeque::new(),
            summary: None,
        };
        session.send_join();
        (session, receiver)
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn timer(&self) -> Option<&MatchTimer> {
        self.timer.as_ref()
    }

    pub fn summary(&self) -> Option<&MatchSummary> {
        self.summary.as_ref()
    }

    pub fn chat(&self) -> impl Iterator<Item = &ChatLine> {
        self.chat.iter()
    }

    pub fn award_state(&self) -> AwardState {
        self.pipeline.state()
    }

    /// Handicap a member negotiated with their ready signal. Carried for
    /// presentation; never folded into the authoritative score.
    pub fn handicap_of(&self, id: ConnectionId) -> Option<u32> {
        self.ready.handicap(id)
    }

    pub fn question_ids(&self) -> &[u32] {
        &self.question_ids
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Current standings over the room roster.
    pub fn ranks(&self) -> Vec<RankEntry> {
        let Some(room) = &self.room else {
            return Vec::new();
        };
        let scores: Vec<(ConnectionId, i64)> = room
            .members()
            .iter()
            .map(|p| (p.connection_id, self.ledger.score(p.connection_id)))
            .collect();
        rank_scores(&scores)
    }

    /// Reducer entry point for everything the relay delivers.
    pub fn handle_event(&mut self, event: RelayEvent, now_ms: u64, ctx: &mut RewardContext<'_>) {
        match event {
            RelayEvent::Joined {
                connection_id,
                room_code,
                capacity,
            } => self.on_joined(connection_id, room_code, capacity),
            RelayEvent::PeerJoined {
                connection_id,
                display_name,
            } => self.on_peer_joined(connection_id, display_name),
            RelayEvent::PeerLeft { connection_id } => self.on_peer_left(connection_id),
            RelayEvent::PeerReady {
                connection_id,
                handicap,
            } => self.ready.mark_ready(connection_id, handicap),
            RelayEvent::MatchStart {
                start_ms,
                question_ids,
            } => self.on_match_start(start_ms, question_ids),
            RelayEvent::Roster { entries } => {
                self.ledger.reconcile(&entries);
                if let Some(room) = &mut self.room {
                    for entry in &entries {
                        match room.member_mut(entry.connection_id) {
                            Some(player) => player.score = entry.score,
                            None => log::warn!(
                                "roster entry for unknown player {}",
                                entry.connection_id
                            ),
                        }
                    }
                }
            }
            RelayEvent::PeerDelta {
                connection_id,
                amount,
                reason: _,
            } => {
                if self.phase == MatchPhase::Playing {
                    self.ledger.apply_peer_delta(connection_id, amount, now_ms);
                }
            }
            RelayEvent::Chat {
                connection_id,
                text,
            } => {
                if text.is_empty() || text.len() > MAX_CHAT_LEN {
                    log::warn!("dropping malformed chat from {}", connection_id);
                    return;
                }
                if self.chat.len() >= CHAT_HISTORY {
                    self.chat.pop_front();
                }
                self.chat.push_back(ChatLine {
                    connection_id,
                    text,
                });
            }
            RelayEvent::RematchRequested { connection_id } => {
                self.rematch.request(connection_id);
            }
            RelayEvent::RematchStart { start_ms } => self.on_rematch_start(start_ms, ctx),
            RelayEvent::MatchEnded => {
                log::info!("room torn down by relay");
                self.teardown();
            }
        }
    }

    /// Drive time-derived progress: countdown into play, expiry into
    /// finished, visual-delta pruning. Call once per UI tick.
    pub fn tick(&mut self, now_ms: u64, ctx: &mut RewardContext<'_>) {
        self.ledger.prune_visuals(now_ms);
        let Some(timer) = self.timer else {
            return;
        };
        match self.phase {
            MatchPhase::Countdown if timer.started(now_ms) => {
                if self.phase.transition(MatchPhase::Playing).is_ok() {
                    log::info!("match started at {}", timer.start_ms());
                }
            }
            MatchPhase::Playing if timer.expired(now_ms) => self.finish(now_ms, ctx),
            _ => {}
        }
    }

    pub fn signal_ready(&mut self, handicap: Option<i64>) -> Result<(), &'static str> {
        if self.phase != MatchPhase::WaitingRoom {
            return Err("Not in waiting room");
        }
        let room = self.room.as_ref().ok_or("Not in a room")?;
        // Handicap negotiation only exists in code-based rooms.
        let handicap = if room.is_code_based() {
            handicap.map(clamp_handicap)
        } else {
            None
        };
        let local = self.local_id.ok_or("No connection id")?;
        self.ready.mark_ready(local, handicap);
        self.phase.transition(MatchPhase::ReadyWait)?;
        self.send(RelayCommand::Ready { handicap });
        Ok(())
    }

    pub fn answer_correct(&mut self, tier: AnswerTier, now_ms: u64) -> Result<(), &'static str> {
        let local = self.playing_player()?;
        self.answered += 1;
        let delta = self.ledger.record_correct(local, tier, now_ms);
        self.send(RelayCommand::ScoreDelta {
            amount: delta.amount,
            reason: delta.reason,
        });
        Ok(())
    }

    pub fn answer_wrong(&mut self, now_ms: u64) -> Result<(), &'static str> {
        let local = self.playing_player()?;
        self.answered += 1;
        if let Some(delta) = self.ledger.record_wrong(local, now_ms) {
            self.send(RelayCommand::ScoreDelta {
                amount: delta.amount,
                reason: delta.reason,
            });
        }
        Ok(())
    }

    pub fn send_chat(&mut self, text: &str) -> Result<(), &'static str> {
        if !self.phase.in_room() {
            return Err("Not in a room");
        }
        if text.is_empty() {
            return Err("Empty message");
        }
        if text.len() > MAX_CHAT_LEN {
            return Err("Message too long");
        }
        self.send(RelayCommand::Chat {
            text: text.to_string(),
        });
        Ok(())
    }

    pub fn request_rematch(&mut self) -> Result<(), &'static str> {
        if self.phase != MatchPhase::Finished {
            return Err("Match is not finished");
        }
        let local = self.local_id.ok_or("No connection id")?;
        self.rematch.request(local);
        self.phase.transition(MatchPhase::RematchWait)?;
        self.send(RelayCommand::RematchRequest);
        Ok(())
    }

    /// Leave the room and drop all local match state. The pending award
    /// slot is deliberately untouched; resumption keeps retrying it.
    pub fn leave(&mut self) {
        if self.phase.in_room() {
            self.send(RelayCommand::Leave);
        }
        self.teardown();
    }

    /// Re-enter matchmaking after a teardown.
    pub fn rejoin(&mut self) -> Result<(), &'static str> {
        if self.phase != MatchPhase::Searching || self.room.is_some() {
            return Err("Already in a room");
        }
        self.send_join();
        Ok(())
    }

    /// Resumption trigger: page load or visibility regained.
    pub fn resume_awards(&mut self, ctx: &mut RewardContext<'_>) -> AwardState {
        self.pipeline.resume(ctx)
    }

    fn on_joined(&mut self, connection_id: ConnectionId, room_code: Option<String>, capacity: u32) {
        if self.phase != MatchPhase::Searching || self.room.is_some() {
            log::warn!("join event outside matchmaking, ignored");
            return;
        }
        let mut room = match room_code {
            Some(code) => Room::with_code(code, capacity as usize),
            None => Room::new(capacity as usize),
        };
        if let Err(reason) = room.add_member(Player::new(
            connection_id,
            self.config.display_name.clone(),
        )) {
            log::warn!("self-join rejected: {}", reason);
        }
        self.local_id = Some(connection_id);
        self.room = Some(room);
        if let Err(reason) = self.phase.transition(MatchPhase::WaitingRoom) {
            log::warn!("{}", reason);
        }
    }

    fn on_peer_joined(&mut self, connection_id: ConnectionId, display_name: String) {
        let Some(room) = &mut self.room else {
            log::warn!("peer join without a room, ignored");
            return;
        };
        if let Err(reason) = room.add_member(Player::new(connection_id, display_name)) {
            log::warn!("peer join rejected: {}", reason);
        }
    }

    fn on_peer_left(&mut self, connection_id: ConnectionId) {
        if let Some(room) = &mut self.room {
            room.remove_member(connection_id);
        }
        self.ready.remove(connection_id);
        self.rematch.remove(connection_id);
    }

    fn on_match_start(&mut self, start_ms: u64, question_ids: Vec<u32>) {
        if self.phase != MatchPhase::ReadyWait {
            log::warn!("match start in {:?}, ignored", self.phase);
            return;
        }
        if let Some(room) = &mut self.room {
            room.set_start(start_ms);
        }
        self.question_ids = question_ids;
        self.answered = 0;
        self.timer = Some(MatchTimer::new(
            start_ms,
            self.config.mode.match_duration_ms,
            self.config.mode.start_grace_ms,
        ));
        let _ = self.phase.transition(MatchPhase::Countdown);
    }

    fn on_rematch_start(&mut self, start_ms: u64, ctx: &mut RewardContext<'_>) {
        if self.phase != MatchPhase::RematchWait {
            log::warn!("rematch start in {:?}, ignored", self.phase);
            return;
        }
        // Reset every piece of per-match state before the new start
        // timestamp applies; nothing may bleed between matches.
        self.reset_match_state(ctx);
        if let Some(room) = &mut self.room {
            room.set_start(start_ms);
        }
        self.timer = Some(MatchTimer::new(
            start_ms,
            self.config.mode.match_duration_ms,
            self.config.mode.start_grace_ms,
        ));
        let _ = self.phase.transition(MatchPhase::Countdown);
    }

    fn finish(&mut self, now_ms: u64, ctx: &mut RewardContext<'_>) {
        if self.phase.transition(MatchPhase::Finished).is_err() {
            return;
        }
        let Some(local) = self.local_id else {
            return;
        };
        let entries = self.ranks();
        let room_size = self.room.as_ref().map(|r| r.member_count()).unwrap_or(0);
        let table = self.config.mode.placement_table;

        let summary_entries: Vec<SummaryEntry> = entries
            .iter()
            .map(|entry| SummaryEntry {
                player_id: entry.player_id,
                display_name: self
                    .room
                    .as_ref()
                    .and_then(|r| r.member(entry.player_id))
                    .map(|p| p.display_name.clone())
                    .unwrap_or_default(),
                score: entry.score,
                rank: entry.rank,
                bonus: bonus_for(&entries, entry.player_id, room_size, table),
            })
            .collect();

        let bonus = bonus_for(&entries, local, room_size, table);
        let points = self.ledger.score(local) / self.config.mode.score_divisor + bonus;
        let exp =
            self.ledger.correct_answers(local) as i64 * self.config.mode.exp_multiplier;

        self.summary = Some(MatchSummary {
            entries: summary_entries,
            local_points: points,
            local_exp: exp,
        });

        let context = format!("{} match reward", mode_label(self.config.mode.game_type));
        let award = PendingAward::new(points, exp, context, now_ms);
        let state = self.pipeline.trigger(award, ctx);
        log::info!("match finished: {} points, {} exp, {:?}", points, exp, state);
    }

    fn reset_match_state(&mut self, ctx: &mut RewardContext<'_>) {
        self.ledger.reset();
        self.ready.clear();
        self.rematch.clear();
        self.answered = 0;
        self.timer = None;
        self.summary = None;
        if let Some(room) = &mut self.room {
            room.clear_start();
            for player in room.members_mut() {
                player.score = 0;
            }
        }
        self.pipeline.reset(ctx.store);
    }

    fn teardown(&mut self) {
        self.room = None;
        self.local_id = None;
        self.timer = None;
        self.question_ids.clear();
        self.answered = 0;
        self.ready.clear();
        self.rematch.clear();
        self.ledger.reset();
        self.chat.clear();
        self.summary = None;
        if self.phase != MatchPhase::Searching {
            let _ = self.phase.transition(MatchPhase::Searching);
        }
    }

    fn playing_player(&mut self) -> Result<ConnectionId, &'static str> {
        if self.phase != MatchPhase::Playing {
            return Err("Match is not in play");
        }
        if self.answered >= self.question_ids.len() {
            return Err("Question list exhausted");
        }
        self.local_id.ok_or("No connection id")
    }

    fn send_join(&mut self) {
        let capacity = self.config.mode.capacity as u32;
        let game_type = self.config.mode.game_type;
        let command = match &self.config.room_code {
            Some(code) => RelayCommand::JoinByCode {
                code: code.clone(),
                capacity,
                game_type,
            },
            None => RelayCommand::JoinRandom {
                capacity,
                game_type,
            },
        };
        self.send(command);
    }

    fn send(&self, command: RelayCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("relay link closed, command dropped");
        }
    }
}

fn mode_label(game_type: GameType) -> &'static str {
    match game_type {
        GameType::Duel => "Duel",
        GameType::BattleRoyale => "Battle royale",
        GameType::ChainChallenge => "Chain challenge",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::{
        AccountError, AccountStore, EventBus, IdentityError, IdentityProvider, LevelChange,
        LogError, LogRow, MemoryStore, RewardLog, UserId,
    };

    struct NullIdentity;

    impl IdentityProvider for NullIdentity {
        fn current_identity(&mut self) -> Result<Option<UserId>, IdentityError> {
            Ok(Some("user-1".to_string()))
        }

        fn refresh_session(&mut self) -> Result<(), IdentityError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingAccounts {
        applied: Vec<(i64, i64)>,
    }

    impl AccountStore for CountingAccounts {
        fn increment(
            &mut self,
            _user: &UserId,
            points_delta: i64,
            exp_delta: i64,
        ) -> Result<LevelChange, AccountError> {
            self.applied.push((points_delta, exp_delta));
            Ok(LevelChange {
                old_level: 1,
                new_level: 1,
            })
        }
    }

    struct NullLog;

    impl RewardLog for NullLog {
        fn append(&mut self, _row: LogRow) -> Result<(), LogError> {
            Ok(())
        }
    }

    struct Harness {
        store: MemoryStore,
        identity: NullIdentity,
        accounts: CountingAccounts,
        log: NullLog,
        bus: EventBus,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                identity: NullIdentity,
                accounts: CountingAccounts::default(),
                log: NullLog,
                bus: EventBus::new(),
            }
        }

        fn ctx(&mut self) -> RewardContext<'_> {
            RewardContext {
                store: &mut self.store,
                identity: &mut self.identity,
                accounts: &mut self.accounts,
                log: &mut self.log,
                bus: &self.bus,
            }
        }
    }

    fn duel_session() -> (MatchSession, UnboundedReceiver<RelayCommand>) {
        MatchSession::begin(SessionConfig {
            display_name: "alice".to_string(),
            mode: ModeConfig::duel(),
            room_code: None,
        })
    }

    fn join_duel(session: &mut MatchSession, h: &mut Harness) {
        session.handle_event(
            RelayEvent::Joined {
                connection_id: 1,
                room_code: None,
                capacity: 2,
            },
            0,
            &mut h.ctx(),
        );
        session.handle_event(
            RelayEvent::PeerJoined {
                connection_id: 2,
                display_name: "bob".to_string(),
            },
            0,
            &mut h.ctx(),
        );
    }

    #[test]
    fn test_begin_sends_join_command() {
        let (_session, mut commands) = duel_session();
        match commands.try_recv().unwrap() {
            RelayCommand::JoinRandom { capacity, game_type } => {
                assert_eq!(capacity, 2);
                assert_eq!(game_type, GameType::Duel);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_join_flow_reaches_waiting_room() {
        let mut h = Harness::new();
        let (mut session, _commands) = duel_session();
        join_duel(&mut session, &mut h);

        assert_eq!(session.phase(), MatchPhase::WaitingRoom);
        assert_eq!(session.local_id(), Some(1));
        assert_eq!(session.room().unwrap().member_count(), 2);
    }

    #[test]
    fn test_ready_then_start_then_play() {
        let mut h = Harness::new();
        let (mut session, mut commands) = duel_session();
        join_duel(&mut session, &mut h);

        session.signal_ready(None).unwrap();
        assert_eq!(session.phase(), MatchPhase::ReadyWait);

        session.handle_event(
            RelayEvent::MatchStart {
                start_ms: 5_000,
                question_ids: vec![10, 11, 12],
            },
            2_000,
            &mut h.ctx(),
        );
        assert_eq!(session.phase(), MatchPhase::Countdown);
        assert_eq!(session.timer().unwrap().countdown_value(2_500), Some(3));

        session.tick(5_000, &mut h.ctx());
        assert_eq!(session.phase(), MatchPhase::Playing);

        session.answer_correct(AnswerTier::Normal, 5_100).unwrap();
        assert_eq!(session.ledger().score(1), 200);

        // Drain join + ready, then the delta must be on the wire.
        let mut saw_delta = false;
        while let Ok(command) = commands.try_recv() {
            if let RelayCommand::ScoreDelta { amount, .. } = command {
                assert_eq!(amount, 200);
                saw_delta = true;
            }
        }
        assert!(saw_delta);
    }

    #[test]
    fn test_handicap_ignored_in_random_rooms() {
        let mut h = Harness::new();
        let (mut session, mut commands) = duel_session();
        join_duel(&mut session, &mut h);

        session.signal_ready(Some(4_230)).unwrap();
        while let Ok(command) = commands.try_recv() {
            if let RelayCommand::Ready { handicap } = command {
                assert_eq!(handicap, None);
            }
        }
    }

    #[test]
    fn test_handicap_clamped_in_code_rooms() {
        let mut h = Harness::new();
        let (mut session, mut commands) = MatchSession::begin(SessionConfig {
            display_name: "alice".to_string(),
            mode: ModeConfig::duel(),
            room_code: Some("XKCD42".to_string()),
        });
        session.handle_event(
            RelayEvent::Joined {
                connection_id: 1,
                room_code: Some("XKCD42".to_string()),
                capacity: 2,
            },
            0,
            &mut h.ctx(),
        );
        session.handle_event(
            RelayEvent::PeerJoined {
                connection_id: 2,
                display_name: "bob".to_string(),
            },
            0,
            &mut h.ctx(),
        );

        session.signal_ready(Some(4_230)).unwrap();
        let mut saw_ready = false;
        while let Ok(command) = commands.try_recv() {
            if let RelayCommand::Ready { handicap } = command {
                assert_eq!(handicap, Some(4_200));
                saw_ready = true;
            }
        }
        assert!(saw_ready);
    }

    #[test]
    fn test_finish_awards_exactly_once() {
        let mut h = Harness::new();
        let (mut session, _commands) = duel_session();
        join_duel(&mut session, &mut h);
        session.signal_ready(None).unwrap();
        session.handle_event(
            RelayEvent::MatchStart {
                start_ms: 0,
                question_ids: vec![1, 2, 3],
            },
            0,
            &mut h.ctx(),
        );
        session.tick(0, &mut h.ctx());
        session.answer_correct(AnswerTier::Hard, 100).unwrap();

        let expiry = session.timer().unwrap().time_left_ms(0);
        session.tick(expiry, &mut h.ctx());
        assert_eq!(session.phase(), MatchPhase::Finished);
        // Duplicate expiry ticks must not re-trigger.
        session.tick(expiry + 100, &mut h.ctx());

        // 300 score / 10 + 50 winner bonus, 1 correct * 2 exp.
        assert_eq!(h.accounts.applied, vec![(80, 2)]);
        let summary = session.summary().unwrap();
        assert_eq!(summary.local_points, 80);
        assert_eq!(summary.local_exp, 2);
    }

    #[test]
    fn test_match_ended_tears_down() {
        let mut h = Harness::new();
        let (mut session, _commands) = duel_session();
        join_duel(&mut session, &mut h);

        session.handle_event(RelayEvent::MatchEnded, 0, &mut h.ctx());
        assert_eq!(session.phase(), MatchPhase::Searching);
        assert!(session.room().is_none());

        // Events for the dead room are no longer trusted.
        session.handle_event(
            RelayEvent::MatchStart {
                start_ms: 0,
                question_ids: vec![1],
            },
            0,
            &mut h.ctx(),
        );
        assert_eq!(session.phase(), MatchPhase::Searching);

        session.rejoin().unwrap();
        assert_eq!(session.phase(), MatchPhase::Searching);
    }

    #[test]
    fn test_rematch_resets_state() {
        let mut h = Harness::new();
        let (mut session, _commands) = duel_session();
        join_duel(&mut session, &mut h);
        session.signal_ready(None).unwrap();
        session.handle_event(
            RelayEvent::MatchStart {
                start_ms: 0,
                question_ids: vec![1, 2],
            },
            0,
            &mut h.ctx(),
        );
        session.tick(0, &mut h.ctx());
        session.answer_correct(AnswerTier::Easy, 10).unwrap();
        let expiry = session.timer().unwrap().time_left_ms(0);
        session.tick(expiry, &mut h.ctx());
        assert_eq!(session.phase(), MatchPhase::Finished);

        session.request_rematch().unwrap();
        assert_eq!(session.phase(), MatchPhase::RematchWait);
        session.handle_event(
            RelayEvent::RematchRequested { connection_id: 2 },
            expiry,
            &mut h.ctx(),
        );
        session.handle_event(
            RelayEvent::RematchStart {
                start_ms: expiry + 5_000,
            },
            expiry,
            &mut h.ctx(),
        );

        assert_eq!(session.phase(), MatchPhase::Countdown);
        assert_eq!(session.ledger().score(1), 0);
        assert!(session.summary().is_none());
        assert_eq!(session.award_state(), AwardState::Idle);
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_chat_validation() {
        let mut h = Harness::new();
        let (mut session, _commands) = duel_session();

        assert_eq!(session.send_chat("hi"), Err("Not in a room"));
        join_duel(&mut session, &mut h);
        assert!(session.send_chat("gl hf").is_ok());
        assert_eq!(session.send_chat(""), Err("Empty message"));
        let long = "x".repeat(MAX_CHAT_LEN + 1);
        assert_eq!(session.send_chat(&long), Err("Message too long"));
    }
}
