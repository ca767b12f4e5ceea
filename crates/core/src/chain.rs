use crate::mode::{AnswerTier, ModeConfig};
use crate::reward::{AwardState, PendingAward, RewardContext, RewardPipeline};

/// Extra points per consecutive link beyond the first.
pub const CHAIN_LINK_BONUS: i64 = 10;

const DEFAULT_SEGMENTS: [u32; 8] = [1, 1, 2, 1, 3, 1, 2, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
    Idle,
    Running,
    Roulette,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainOutcome {
    pub multiplier: u32,
    pub final_score: i64,
    pub points: i64,
    pub exp: i64,
}

/// Fixed multiplier wheel. The roll is injected by the caller, so
/// outcomes are deterministic under test and the wheel stays free of any
/// randomness source.
#[derive(Debug, Clone)]
pub struct RouletteWheel {
    segments: &'static [u32],
}

impl RouletteWheel {
    pub fn new() -> Self {
        Self {
            segments: &DEFAULT_SEGMENTS,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn spin(&self, roll: u32) -> u32 {
        self.segments[roll as usize % self.segments.len()]
    }
}

impl Default for RouletteWheel {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-player run: consecutive correct answers build a chain, a wrong
/// answer breaks it, and the run settles through a bonus roulette whose
/// multiplier scales the chain score before the shared reward pipeline
/// posts it under the chain-challenge mode key.
pub struct ChainChallenge {
    mode: ModeConfig,
    phase: ChainPhase,
    chain: u32,
    best_chain: u32,
    score: i64,
    correct: u32,
    pipeline: RewardPipeline,
    wheel: RouletteWheel,
}

impl ChainChallenge {
    pub fn new() -> Self {
        let mode = ModeConfig::chain_challenge();
        let pipeline = RewardPipeline::new(mode.pending_slot);
        Self {
            mode,
            phase: ChainPhase::Idle,
            chain: 0,
            best_chain: 0,
            score: 0,
            correct: 0,
            pipeline,
            wheel: RouletteWheel::new(),
        }
    }

    pub fn phase(&self) -> ChainPhase {
        self.phase
    }

    pub fn chain(&self) -> u32 {
        self.chain
    }

    pub fn best_chain(&self) -> u32 {
        self.best_chain
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn award_state(&self) -> AwardState {
        self.pipeline.state()
    }

    /// Begin a fresh run. The pipeline is replaced rather than reset so
    /// an unapplied award from an earlier run stays on disk for the next
    /// resumption trigger.
    pub fn start(&mut self) -> Result<(), &'static str> {
        if !matches!(self.phase, ChainPhase::Idle | ChainPhase::Settled) {
            return Err("Run already in progress");
        }
        self.phase = ChainPhase::Running;
        self.chain = 0;
        self.best_chain = 0;
        self.score = 0;
        self.correct = 0;
        self.pipeline = RewardPipeline::new(self.mode.pending_slot);
        Ok(())
    }

    pub fn answer_correct(&mut self, tier: AnswerTier) -> Result<(), &'static str> {
        if self.phase != ChainPhase::Running {
            return Err("Run is not active");
        }
        self.chain += 1;
        self.best_chain = self.best_chain.max(self.chain);
        self.correct += 1;
        self.score += tier.points() + (self.chain as i64 - 1) * CHAIN_LINK_BONUS;
        Ok(())
    }

    pub fn answer_wrong(&mut self) -> Result<(), &'static str> {
        if self.phase != ChainPhase::Running {
            return Err("Run is not active");
        }
        self.chain = 0;
        Ok(())
    }

    pub fn finish_run(&mut self) -> Result<(), &'static str> {
        if self.phase != ChainPhase::Running {
            return Err("Run is not active");
        }
        self.phase = ChainPhase::Roulette;
        Ok(())
    }

    /// Settle the run: scale the chain score by the rolled multiplier
    /// and post the award through the shared pipeline.
    pub fn spin(
        &mut self,
        roll: u32,
        now_ms: u64,
        ctx: &mut RewardContext<'_>,
    ) -> Result<ChainOutcome, &'static str> {
        if self.phase != ChainPhase::Roulette {
            return Err("Roulette is not armed");
        }
        let multiplier = self.wheel.spin(roll);
        let final_score = self.score * multiplier as i64;
        let points = final_score / self.mode.score_divisor;
        let exp = self.correct as i64 * self.mode.exp_multiplier;

        let award = PendingAward::new(points, exp, "Chain challenge reward", now_ms);
        self.pipeline.trigger(award, ctx);
        self.phase = ChainPhase::Settled;

        Ok(ChainOutcome {
            multiplier,
            final_score,
            points,
            exp,
        })
    }

    /// Resumption trigger: page load or visibility regained.
    pub fn resume_awards(&mut self, ctx: &mut RewardContext<'_>) -> AwardState {
        self.pipeline.resume(ctx)
    }
}

impl Default for ChainChallenge {
    fn default() -> Self {
        Self::new()
    }
}
