//! Resolution phases, their settle delays, and the events a front end subscribes to.

use crate::grid::Pos;
use std::collections::BTreeSet;
use std::time::Duration;

/// What the engine is doing between two `GameSession::step` calls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Tentative swap applied, not yet evaluated.
    Swapped { a: Pos, b: Pos },
    /// Swap produced nothing and was undone.
    Reverting,
    /// Cells found by the detector, about to be cleared.
    Matched { cells: BTreeSet<Pos> },
    Cleared,
    Compacted,
    Refilled,
}

/// Coarse view used by input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    AwaitingSwap,
    Resolving,
}

/// Settle delay after each phase. Purely cosmetic: the final state never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub swap: Duration,
    pub revert: Duration,
    pub highlight: Duration,
    pub clear: Duration,
    pub gravity: Duration,
    pub refill: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            swap: Duration::from_millis(300),
            revert: Duration::from_millis(300),
            highlight: Duration::from_millis(350),
            clear: Duration::from_millis(100),
            gravity: Duration::from_millis(300),
            refill: Duration::from_millis(300),
        }
    }
}

impl Pacing {
    /// No delays; used by tests and `--no-animation`.
    pub const fn instant() -> Self {
        Self {
            swap: Duration::ZERO,
            revert: Duration::ZERO,
            highlight: Duration::ZERO,
            clear: Duration::ZERO,
            gravity: Duration::ZERO,
            refill: Duration::ZERO,
        }
    }

    /// Delay to wait after entering `phase`.
    pub fn after(&self, phase: &Phase) -> Duration {
        match phase {
            Phase::Idle => Duration::ZERO,
            Phase::Swapped { .. } => self.swap,
            Phase::Reverting => self.revert,
            Phase::Matched { .. } => self.highlight,
            Phase::Cleared => self.clear,
            Phase::Compacted => self.gravity,
            Phase::Refilled => self.refill,
        }
    }
}

/// Why a swap request did not start a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRejection {
    /// A cascade is in flight.
    Busy,
    NoMovesLeft,
    /// The level is already won or lost.
    LevelOver,
    OutOfBounds,
    SameCell,
    NotAdjacent,
}

/// Result of `GameSession::request_swap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRequest {
    Accepted,
    Rejected(SwapRejection),
}

/// State-change notifications, drained by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LevelStarted { level: u32 },
    SelectionChanged { selection: Option<Pos> },
    SwapStarted { a: Pos, b: Pos },
    SwapRejected { reason: SwapRejection },
    SwapReverted { a: Pos, b: Pos },
    MoveConsumed { moves_remaining: u32 },
    Matched { cells: BTreeSet<Pos> },
    Cleared { cells: BTreeSet<Pos>, points: u32 },
    Compacted { moved: usize },
    Refilled { cells: Vec<Pos> },
    Shuffled { attempts: u32 },
    Settled,
    LevelWon { level: u32, score: u32 },
    LevelLost { level: u32, score: u32 },
}
