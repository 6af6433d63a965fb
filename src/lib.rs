//! matchtui — match-3 board engine.
//!
//! Pure game logic: grid, match detection, cascading resolution, dead-board reshuffle and
//! level progression, plus the local account/progress store. The terminal front end lives
//! in the binary and only talks to [`session::GameSession`] and [`store`].

pub mod grid;
pub mod level;
pub mod matcher;
pub mod phase;
pub mod session;
pub mod solver;
pub mod spawn;
pub mod store;

pub use grid::{Direction, Grid, Pos, TileKind};
pub use level::{LevelConfig, LevelOutcome, SCORE_PER_TILE, level_config};
pub use phase::{EngineState, Pacing, Phase, SessionEvent, SwapRejection, SwapRequest};
pub use session::GameSession;

/// Smallest board side a session plays on.
pub const MIN_BOARD_SIDE: usize = 5;
/// Largest board side a session plays on.
pub const MAX_BOARD_SIDE: usize = 12;

/// Board dimensions, randomness and pacing for a session (derived from CLI options).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Fixed seed for reproducible games; OS entropy when `None`.
    pub seed: Option<u64>,
    pub pacing: Pacing,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            seed: None,
            pacing: Pacing::default(),
        }
    }
}

impl GameConfig {
    /// `rows` and `cols`, each clamped to `MIN_BOARD_SIDE..=MAX_BOARD_SIDE`.
    pub fn board_size(&self) -> (usize, usize) {
        (
            self.rows.clamp(MIN_BOARD_SIDE, MAX_BOARD_SIDE),
            self.cols.clamp(MIN_BOARD_SIDE, MAX_BOARD_SIDE),
        )
    }
}
