mod relay;
mod stores;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;

use quizmatch::{
    AnswerTier, AwardState, ChainChallenge, EventBus, MatchSession, MemoryStore, ModeConfig,
    RelayCommand, RewardContext, SessionConfig,
};

use relay::LoopbackRelay;
use stores::{DemoAccounts, DemoIdentity, DemoLog};

const QUESTION_COUNT: u32 = 8;
const MATCH_START_MS: u64 = 3_000;

#[derive(Parser)]
#[command(name = "quizmatch-demo")]
#[command(about = "Simulated quiz matches against a loopback relay")]
struct Args {
    #[arg(long, default_value = "duel", help = "Scenario: duel, royale, chain")]
    scenario: String,

    #[arg(long, default_value_t = 4, help = "Room size for the royale scenario")]
    players: usize,

    #[arg(long, default_value_t = 4, help = "Roulette roll for the chain scenario")]
    roll: u32,

    #[arg(long, help = "Fail the first reward apply to exercise resumption")]
    flaky: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.scenario.as_str() {
        "duel" => run_multiplayer(ModeConfig::duel(), &["alice", "bob"], args.flaky),
        "royale" => {
            let players = args.players.clamp(2, 8);
            let names = ["alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi"];
            run_multiplayer(
                ModeConfig::battle_royale(players),
                &names[..players],
                args.flaky,
            )
        }
        "chain" => run_chain(args.roll),
        other => anyhow::bail!("unknown scenario: {}", other),
    }
}

enum Action {
    Correct(AnswerTier),
    Wrong,
    Chat(&'static str),
}

struct Seat {
    name: String,
    session: MatchSession,
    commands: UnboundedReceiver<RelayCommand>,
    store: MemoryStore,
    identity: DemoIdentity,
    accounts: DemoAccounts,
    log: DemoLog,
    bus: EventBus,
}

impl Seat {
    fn new(name: &str, mode: ModeConfig) -> Self {
        let (session, commands) = MatchSession::begin(SessionConfig {
            display_name: name.to_string(),
            mode,
            room_code: None,
        });
        let mut bus = EventBus::new();
        let label = name.to_string();
        bus.subscribe(move |event| log::info!("{}: account event {:?}", label, event));
        Self {
            name: name.to_string(),
            session,
            commands,
            store: MemoryStore::new(),
            identity: DemoIdentity {
                user: format!("user-{}", name),
            },
            accounts: DemoAccounts::default(),
            log: DemoLog,
            bus,
        }
    }

    fn tick(&mut self, now_ms: u64) {
        let mut ctx = RewardContext {
            store: &mut self.store,
            identity: &mut self.identity,
            accounts: &mut self.accounts,
            log: &mut self.log,
            bus: &self.bus,
        };
        self.session.tick(now_ms, &mut ctx);
    }
}

/// Drain every seat's outbound commands through the relay and deliver
/// the resulting events, until the room settles.
fn pump(relay: &mut LoopbackRelay, seats: &mut [Seat], now_ms: u64) {
    loop {
        let mut deliveries = Vec::new();
        for (index, seat) in seats.iter_mut().enumerate() {
            while let Ok(command) = seat.commands.try_recv() {
                deliveries.extend(relay.handle(index, command, now_ms));
            }
        }
        if deliveries.is_empty() {
            break;
        }
        for (target, event) in deliveries {
            let seat = &mut seats[target];
            let mut ctx = RewardContext {
                store: &mut seat.store,
                identity: &mut seat.identity,
                accounts: &mut seat.accounts,
                log: &mut seat.log,
                bus: &seat.bus,
            };
            seat.session.handle_event(event, now_ms, &mut ctx);
        }
    }
}

fn script_for(seat: usize) -> Vec<(u64, Action)> {
    match seat % 3 {
        0 => vec![
            (800, Action::Chat("gl hf")),
            (1_000, Action::Correct(AnswerTier::Normal)),
            (2_500, Action::Correct(AnswerTier::Hard)),
            (4_000, Action::Wrong),
        ],
        1 => vec![
            (1_200, Action::Correct(AnswerTier::Easy)),
            (2_000, Action::Wrong),
            (3_000, Action::Wrong),
            (3_600, Action::Wrong),
        ],
        _ => vec![
            (1_500, Action::Correct(AnswerTier::Easy)),
            (2_800, Action::Correct(AnswerTier::Normal)),
        ],
    }
}

fn run_multiplayer(mode: ModeConfig, names: &[&str], flaky: bool) -> Result<()> {
    let mut relay = LoopbackRelay::new(
        mode.capacity,
        QUESTION_COUNT,
        names.iter().map(|n| n.to_string()).collect(),
    );
    let mut seats: Vec<Seat> = names.iter().map(|name| Seat::new(name, mode.clone())).collect();
    if flaky {
        let last = seats.len() - 1;
        seats[last].accounts.fail_remaining = 1;
        log::info!("{} will lose the first reward call", seats[last].name);
    }

    pump(&mut relay, &mut seats, 0);
    for seat in seats.iter_mut() {
        seat.session
            .signal_ready(None)
            .map_err(|reason| anyhow::anyhow!(reason))?;
    }
    pump(&mut relay, &mut seats, 0);

    // The relay scheduled the start; walk the scripted answers.
    let mut timeline: Vec<(u64, usize, Action)> = Vec::new();
    for (index, _) in names.iter().enumerate() {
        for (offset, action) in script_for(index) {
            timeline.push((MATCH_START_MS + offset, index, action));
        }
    }
    timeline.sort_by_key(|(at, _, _)| *at);

    for (at, index, action) in timeline {
        for seat in seats.iter_mut() {
            seat.tick(at);
        }
        let session = &mut seats[index].session;
        let outcome = match action {
            Action::Correct(tier) => session.answer_correct(tier, at),
            Action::Wrong => session.answer_wrong(at),
            Action::Chat(text) => session.send_chat(text),
        };
        if let Err(reason) = outcome {
            log::warn!("{}: action dropped: {}", seats[index].name, reason);
        }
        pump(&mut relay, &mut seats, at);
    }

    let expiry = MATCH_START_MS + mode.match_duration_ms + mode.start_grace_ms + 1;
    for seat in seats.iter_mut() {
        seat.tick(expiry);
    }
    pump(&mut relay, &mut seats, expiry);

    if let Some(summary) = seats[0].session.summary() {
        println!("final standings:");
        for entry in &summary.entries {
            println!(
                "  #{} {:<8} score {:>5}  bonus {:>4}",
                entry.rank, entry.display_name, entry.score, entry.bonus
            );
        }
    }
    for seat in &seats {
        println!(
            "{}: award {:?}, balance {} points / {} exp",
            seat.name,
            seat.session.award_state(),
            seat.accounts.points,
            seat.accounts.exp
        );
    }

    // Anyone stuck in an error state gets the reload treatment: fresh
    // session, same durable store, resumption completes the award.
    for seat in seats.iter_mut() {
        if seat.session.award_state() != AwardState::Error {
            continue;
        }
        log::info!("simulating reload for {}", seat.name);
        let (mut fresh, _commands) = MatchSession::begin(SessionConfig {
            display_name: seat.name.clone(),
            mode: mode.clone(),
            room_code: None,
        });
        let mut ctx = RewardContext {
            store: &mut seat.store,
            identity: &mut seat.identity,
            accounts: &mut seat.accounts,
            log: &mut seat.log,
            bus: &seat.bus,
        };
        let state = fresh.resume_awards(&mut ctx);
        println!(
            "{}: after reload award {:?}, balance {} points / {} exp",
            seat.name, state, seat.accounts.points, seat.accounts.exp
        );
    }

    Ok(())
}

fn run_chain(roll: u32) -> Result<()> {
    let mut store = MemoryStore::new();
    let mut identity = DemoIdentity {
        user: "user-alice".to_string(),
    };
    let mut accounts = DemoAccounts::default();
    let mut log_sink = DemoLog;
    let mut bus = EventBus::new();
    bus.subscribe(|event| log::info!("account event {:?}", event));

    let mut run = ChainChallenge::new();
    run.start().map_err(|reason| anyhow::anyhow!(reason))?;

    for tier in [
        AnswerTier::Easy,
        AnswerTier::Normal,
        AnswerTier::Normal,
        AnswerTier::Hard,
    ] {
        run.answer_correct(tier).map_err(|reason| anyhow::anyhow!(reason))?;
    }
    run.answer_wrong().map_err(|reason| anyhow::anyhow!(reason))?;
    run.answer_correct(AnswerTier::Hard)
        .map_err(|reason| anyhow::anyhow!(reason))?;
    run.finish_run().map_err(|reason| anyhow::anyhow!(reason))?;

    let mut ctx = RewardContext {
        store: &mut store,
        identity: &mut identity,
        accounts: &mut accounts,
        log: &mut log_sink,
        bus: &bus,
    };
    let outcome = run
        .spin(roll, 10_000, &mut ctx)
        .map_err(|reason| anyhow::anyhow!(reason))?;

    println!(
        "chain run: best chain {}, score {} x{} = {}",
        run.best_chain(),
        run.score(),
        outcome.multiplier,
        outcome.final_score
    );
    println!(
        "award {:?}: {} points / {} exp (balance {} / {})",
        run.award_state(),
        outcome.points,
        outcome.exp,
        accounts.points,
        accounts.exp
    );

    Ok(())
}
