//! Game session: the swap → match → clear → gravity → refill state machine and level transitions.
//!
//! A `GameSession` owns its grid outright. Front ends feed it input (`select`, `swipe`,
//! `request_swap`), call `step` whenever the previous settle delay has elapsed, and drain
//! `SessionEvent`s to drive rendering. Nothing here sleeps or renders.

use crate::GameConfig;
use crate::grid::{Direction, Grid, Pos};
use crate::level::{self, LevelConfig, LevelOutcome, SCORE_PER_TILE};
use crate::matcher::find_matches;
use crate::phase::{EngineState, Pacing, Phase, SessionEvent, SwapRejection, SwapRequest};
use crate::solver;
use crate::spawn;
use crate::store::Progress;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

#[derive(Debug)]
pub struct GameSession {
    player: String,
    rows: usize,
    cols: usize,
    grid: Grid,
    config: LevelConfig,
    level: u32,
    score: u32,
    total_score: u32,
    /// Score and total when the current attempt began; restored by `retry_level`.
    attempt_start: (u32, u32),
    moves_remaining: u32,
    selection: Option<Pos>,
    phase: Phase,
    outcome: LevelOutcome,
    pacing: Pacing,
    rng: StdRng,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Start at the saved level of `progress`, with its total carried and a fresh level score.
    pub fn new(config: &GameConfig, progress: &Progress) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let level = progress.level.max(1);
        let (rows, cols) = config.board_size();
        if (rows, cols) != (config.rows, config.cols) {
            log::warn!(
                "board {}x{} is out of range, playing {}x{}",
                config.rows,
                config.cols,
                rows,
                cols
            );
        }
        let mut session = Self {
            player: progress.username.clone(),
            rows,
            cols,
            grid: Grid::new(rows, cols),
            config: level::level_config(level),
            level,
            score: 0,
            total_score: progress.total_score,
            attempt_start: (0, progress.total_score),
            moves_remaining: 0,
            selection: None,
            phase: Phase::Idle,
            outcome: LevelOutcome::Playing,
            pacing: config.pacing,
            rng,
            events: Vec::new(),
        };
        session.start_level(level, 0);
        session
    }

    /// Session on a scripted board with explicit level parameters (level 1, score 0).
    pub fn with_board(grid: Grid, config: LevelConfig, pacing: Pacing, seed: u64) -> Self {
        Self {
            player: String::from("guest"),
            rows: grid.rows(),
            cols: grid.cols(),
            grid,
            moves_remaining: config.move_budget,
            config,
            level: 1,
            score: 0,
            total_score: 0,
            attempt_start: (0, 0),
            selection: None,
            phase: Phase::Idle,
            outcome: LevelOutcome::Playing,
            pacing,
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    // --- accessors ---

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn selection(&self) -> Option<Pos> {
        self.selection
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn outcome(&self) -> LevelOutcome {
        self.outcome
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn set_pacing(&mut self, pacing: Pacing) {
        self.pacing = pacing;
    }

    /// The processing flag: set from an accepted swap until the cascade settles.
    pub fn is_processing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn engine_state(&self) -> EngineState {
        if self.is_processing() {
            EngineState::Resolving
        } else if self.selection.is_some() {
            EngineState::AwaitingSwap
        } else {
            EngineState::Idle
        }
    }

    /// Settle delay owed for the current phase.
    pub fn current_delay(&self) -> Duration {
        self.pacing.after(&self.phase)
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot for the progress store.
    pub fn progress(&self) -> Progress {
        Progress {
            username: self.player.clone(),
            level: self.level,
            total_score: self.total_score,
        }
    }

    fn accepts_input(&self) -> bool {
        !self.is_processing() && self.outcome == LevelOutcome::Playing && self.moves_remaining > 0
    }

    // --- input ---

    /// Two-click selection. Returns the swap request when this click completed a pair.
    pub fn select(&mut self, pos: Pos) -> Option<SwapRequest> {
        if !self.accepts_input() || !self.grid.in_bounds(pos) {
            return None;
        }
        match self.selection {
            Some(first) if first == pos => {
                self.set_selection(None);
                None
            }
            Some(first) if Grid::is_adjacent(first, pos) => Some(self.request_swap(first, pos)),
            _ => {
                self.set_selection(Some(pos));
                None
            }
        }
    }

    /// Swap `pos` with its neighbour in `dir`.
    pub fn swipe(&mut self, pos: Pos, dir: Direction) -> SwapRequest {
        match self.grid.neighbor(pos, dir) {
            Some(target) => self.request_swap(pos, target),
            None => self.reject(SwapRejection::OutOfBounds),
        }
    }

    /// Validate and apply a tentative swap. Rejections leave the grid, moves and score untouched.
    pub fn request_swap(&mut self, a: Pos, b: Pos) -> SwapRequest {
        let rejection = if self.is_processing() {
            Some(SwapRejection::Busy)
        } else if self.outcome != LevelOutcome::Playing {
            Some(SwapRejection::LevelOver)
        } else if self.moves_remaining == 0 {
            Some(SwapRejection::NoMovesLeft)
        } else if !self.grid.in_bounds(a) || !self.grid.in_bounds(b) {
            Some(SwapRejection::OutOfBounds)
        } else if a == b {
            Some(SwapRejection::SameCell)
        } else if !Grid::is_adjacent(a, b) {
            Some(SwapRejection::NotAdjacent)
        } else {
            None
        };
        if let Some(reason) = rejection {
            return self.reject(reason);
        }

        self.grid.swap(a, b);
        if self.selection.is_some() {
            self.set_selection(None);
        }
        self.phase = Phase::Swapped { a, b };
        self.events.push(SessionEvent::SwapStarted { a, b });
        SwapRequest::Accepted
    }

    fn reject(&mut self, reason: SwapRejection) -> SwapRequest {
        log::trace!("swap rejected: {:?}", reason);
        self.events.push(SessionEvent::SwapRejected { reason });
        SwapRequest::Rejected(reason)
    }

    fn set_selection(&mut self, selection: Option<Pos>) {
        self.selection = selection;
        self.events.push(SessionEvent::SelectionChanged { selection });
    }

    // --- resolution ---

    /// Advance one phase. Returns the delay before the next call, or `None` once idle.
    pub fn step(&mut self) -> Option<Duration> {
        let next = match std::mem::take(&mut self.phase) {
            Phase::Idle => return None,
            Phase::Swapped { a, b } => {
                let cells = find_matches(&self.grid);
                if cells.is_empty() {
                    self.grid.swap(a, b);
                    self.events.push(SessionEvent::SwapReverted { a, b });
                    Phase::Reverting
                } else {
                    self.moves_remaining = self.moves_remaining.saturating_sub(1);
                    self.events.push(SessionEvent::MoveConsumed {
                        moves_remaining: self.moves_remaining,
                    });
                    self.events.push(SessionEvent::Matched {
                        cells: cells.clone(),
                    });
                    Phase::Matched { cells }
                }
            }
            Phase::Reverting => {
                self.settle(false);
                Phase::Idle
            }
            Phase::Matched { cells } => {
                for &pos in &cells {
                    self.grid.set(pos, None);
                }
                let points = cells.len() as u32 * SCORE_PER_TILE;
                self.score = self.score.saturating_add(points);
                self.total_score = self.total_score.saturating_add(points);
                log::debug!("cleared {} cells for {} points", cells.len(), points);
                self.events.push(SessionEvent::Cleared { cells, points });
                Phase::Cleared
            }
            Phase::Cleared => {
                let moved = self.grid.apply_gravity();
                self.events.push(SessionEvent::Compacted { moved });
                Phase::Compacted
            }
            Phase::Compacted => {
                let cells = spawn::refill(
                    &mut self.grid,
                    self.config.palette_size,
                    self.config.special_spawn_chance,
                    &mut self.rng,
                );
                self.events.push(SessionEvent::Refilled { cells });
                Phase::Refilled
            }
            Phase::Refilled => {
                let cells = find_matches(&self.grid);
                if cells.is_empty() {
                    self.settle(true);
                    Phase::Idle
                } else {
                    log::debug!("cascade: {} more cells matched", cells.len());
                    self.events.push(SessionEvent::Matched {
                        cells: cells.clone(),
                    });
                    Phase::Matched { cells }
                }
            }
        };
        self.phase = next;
        (self.phase != Phase::Idle).then(|| self.current_delay())
    }

    /// Step with no delay until idle. Returns the number of steps taken.
    pub fn run_until_idle(&mut self) -> usize {
        let mut steps = 0;
        while self.is_processing() {
            self.step();
            steps += 1;
        }
        steps
    }

    /// End of a resolution: fix dead boards (only after a cascade changed the board), then
    /// evaluate the level.
    fn settle(&mut self, board_changed: bool) {
        if board_changed
            && solver::can_offer_moves(self.rows, self.cols)
            && !solver::has_potential_match(&mut self.grid)
        {
            let (candidate, attempts) =
                solver::shuffle(&self.grid, self.config.palette_size, &mut self.rng);
            log::debug!("no moves left on board, reshuffled after {} attempts", attempts);
            self.grid = candidate;
            self.events.push(SessionEvent::Shuffled { attempts });
        }
        self.events.push(SessionEvent::Settled);
        self.check_completion();
    }

    // --- level director ---

    /// Re-evaluate won/lost. Emits an event the first time the outcome changes.
    pub fn check_completion(&mut self) -> LevelOutcome {
        let outcome = level::completion(self.score, self.moves_remaining, &self.config);
        if outcome != self.outcome {
            self.outcome = outcome;
            match outcome {
                LevelOutcome::Won => {
                    log::info!("level {} won with {} points", self.level, self.score);
                    self.events.push(SessionEvent::LevelWon {
                        level: self.level,
                        score: self.score,
                    });
                }
                LevelOutcome::Lost => {
                    log::info!("level {} lost with {} points", self.level, self.score);
                    self.events.push(SessionEvent::LevelLost {
                        level: self.level,
                        score: self.score,
                    });
                }
                LevelOutcome::Playing => {}
            }
        }
        outcome
    }

    /// Replace the board and counters for `level`, starting from `carried_score`.
    pub fn start_level(&mut self, level: u32, carried_score: u32) {
        let level = level.max(1);
        self.level = level;
        self.config = level::level_config(level);
        self.moves_remaining = self.config.move_budget;
        self.score = carried_score;
        self.attempt_start = (carried_score, self.total_score);
        self.selection = None;
        self.phase = Phase::Idle;
        self.outcome = LevelOutcome::Playing;

        let palette = self.config.palette_size;
        let mut grid = spawn::generate_board(self.rows, self.cols, palette, &mut self.rng);
        if solver::can_offer_moves(self.rows, self.cols) && !solver::has_potential_match(&mut grid)
        {
            grid = solver::shuffle(&grid, palette, &mut self.rng).0;
        }
        self.grid = grid;
        log::info!(
            "level {} started: palette {}, {} moves, target {}",
            level,
            palette,
            self.config.move_budget,
            self.config.score_target
        );
        self.events.push(SessionEvent::LevelStarted { level });
    }

    /// Proceed after a win, carrying the overflow. Returns the record to persist.
    pub fn advance_level(&mut self) -> Option<Progress> {
        if self.outcome != LevelOutcome::Won {
            return None;
        }
        let carried = level::overflow(self.score, &self.config);
        self.start_level(self.level + 1, carried);
        Some(self.progress())
    }

    /// Play the current level again from the score it started with.
    pub fn retry_level(&mut self) {
        let (score, total) = self.attempt_start;
        self.total_score = total;
        self.start_level(self.level, score);
    }

    /// Back to level 1 with nothing banked.
    pub fn restart_from_first_level(&mut self) {
        self.total_score = 0;
        self.start_level(1, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileKind;
    use crate::grid::tests::board;

    fn scenario_config() -> LevelConfig {
        LevelConfig {
            palette_size: 4,
            move_budget: 25,
            score_target: 70,
            special_spawn_chance: 0.0,
        }
    }

    /// 8x8, no runs. Swapping (0,2) with (1,2) lines up 0s on the top row.
    fn scenario_board() -> Grid {
        board(&[
            "00120312", "12002031", "23013120", "30120213", "01231302", "12302013", "23013120",
            "30120231",
        ])
    }

    fn session() -> GameSession {
        GameSession::with_board(scenario_board(), scenario_config(), Pacing::instant(), 11)
    }

    #[test]
    fn test_scenario_board_is_stable() {
        assert!(find_matches(&scenario_board()).is_empty());
    }

    #[test]
    fn test_three_run_scores_three_tiles_on_first_pass() {
        let mut s = session();
        assert_eq!(
            s.request_swap(Pos::new(0, 2), Pos::new(1, 2)),
            SwapRequest::Accepted
        );
        s.step(); // evaluate swap
        assert_eq!(s.moves_remaining(), 24);
        s.step(); // clear
        assert_eq!(s.score(), 3 * SCORE_PER_TILE);
        let cleared = s.drain_events().into_iter().find_map(|e| match e {
            SessionEvent::Cleared { cells, points } => Some((cells, points)),
            _ => None,
        });
        let (cells, points) = cleared.expect("cleared event");
        assert_eq!(points, 30);
        assert_eq!(
            cells.into_iter().collect::<Vec<_>>(),
            vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2)]
        );
    }

    #[test]
    fn test_swap_without_match_reverts() {
        let mut s = session();
        let before = s.grid().clone();
        assert_eq!(
            s.request_swap(Pos::new(7, 6), Pos::new(7, 7)),
            SwapRequest::Accepted
        );
        assert!(s.is_processing());
        s.run_until_idle();
        assert_eq!(s.grid(), &before);
        assert_eq!(s.moves_remaining(), 25);
        assert_eq!(s.score(), 0);
        assert!(
            s.drain_events()
                .iter()
                .any(|e| matches!(e, SessionEvent::SwapReverted { .. }))
        );
    }

    #[test]
    fn test_invalid_swaps_are_noops() {
        let mut s = session();
        let before = s.grid().clone();
        let cases = [
            (Pos::new(0, 0), Pos::new(0, 0), SwapRejection::SameCell),
            (Pos::new(0, 0), Pos::new(0, 2), SwapRejection::NotAdjacent),
            (Pos::new(0, 0), Pos::new(1, 1), SwapRejection::NotAdjacent),
            (Pos::new(7, 7), Pos::new(7, 8), SwapRejection::OutOfBounds),
        ];
        for (a, b, reason) in cases {
            assert_eq!(s.request_swap(a, b), SwapRequest::Rejected(reason));
            assert!(!s.is_processing());
        }
        assert_eq!(s.grid(), &before);
        assert_eq!(s.moves_remaining(), 25);
    }

    #[test]
    fn test_input_ignored_while_processing() {
        let mut s = session();
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        let mid = s.grid().clone();
        assert_eq!(
            s.request_swap(Pos::new(5, 5), Pos::new(5, 6)),
            SwapRequest::Rejected(SwapRejection::Busy)
        );
        assert_eq!(s.select(Pos::new(4, 4)), None);
        assert_eq!(s.selection(), None);
        assert_eq!(s.grid(), &mid);
    }

    #[test]
    fn test_cascade_settles_to_stable_board() {
        let mut s = session();
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        let steps = s.run_until_idle();
        assert!(steps >= 5);
        assert!(s.grid().is_full());
        assert!(find_matches(s.grid()).is_empty());
        let mut g = s.grid().clone();
        assert!(solver::has_potential_match(&mut g));
    }

    #[test]
    fn test_score_is_sum_of_cleared_events() {
        let mut s = session();
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        s.run_until_idle();
        let sum: u32 = s
            .drain_events()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Cleared { cells, points } => {
                    assert_eq!(*points, cells.len() as u32 * SCORE_PER_TILE);
                    Some(*points)
                }
                _ => None,
            })
            .sum();
        assert_eq!(s.score(), sum);
        assert!(sum >= 30);
    }

    #[test]
    fn test_two_click_selection() {
        let mut s = session();
        assert_eq!(s.select(Pos::new(0, 2)), None);
        assert_eq!(s.engine_state(), EngineState::AwaitingSwap);
        // Same cell toggles off.
        assert_eq!(s.select(Pos::new(0, 2)), None);
        assert_eq!(s.selection(), None);
        // Far cell moves the selection.
        s.select(Pos::new(0, 2));
        assert_eq!(s.select(Pos::new(5, 5)), None);
        assert_eq!(s.selection(), Some(Pos::new(5, 5)));
        s.select(Pos::new(0, 2));
        assert_eq!(s.select(Pos::new(1, 2)), Some(SwapRequest::Accepted));
        assert_eq!(s.selection(), None);
        assert_eq!(s.engine_state(), EngineState::Resolving);
    }

    #[test]
    fn test_swipe_off_board_is_noop() {
        let mut s = session();
        let before = s.grid().clone();
        assert_eq!(
            s.swipe(Pos::new(0, 0), Direction::Up),
            SwapRequest::Rejected(SwapRejection::OutOfBounds)
        );
        assert_eq!(s.grid(), &before);
        assert_eq!(s.swipe(Pos::new(1, 2), Direction::Up), SwapRequest::Accepted);
    }

    #[test]
    fn test_reaching_target_wins() {
        let mut s = session();
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        s.run_until_idle();
        // First swap scores at least 30; keep scoring until the 70 target falls.
        let mut guard = 0;
        while s.outcome() == LevelOutcome::Playing && guard < 25 {
            guard += 1;
            let swap = find_scoring_swap(&mut s.grid().clone());
            let (a, b) = swap.expect("board is solvable");
            s.request_swap(a, b);
            s.run_until_idle();
        }
        assert_eq!(s.outcome(), LevelOutcome::Won);
        assert!(s.score() >= 70);
        assert_eq!(
            s.request_swap(Pos::new(0, 0), Pos::new(0, 1)),
            SwapRequest::Rejected(SwapRejection::LevelOver)
        );
    }

    #[test]
    fn test_out_of_moves_loses() {
        let mut cfg = scenario_config();
        cfg.move_budget = 1;
        cfg.score_target = 10_000;
        let mut s = GameSession::with_board(scenario_board(), cfg, Pacing::instant(), 3);
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        s.run_until_idle();
        assert_eq!(s.moves_remaining(), 0);
        assert_eq!(s.outcome(), LevelOutcome::Lost);
        assert!(
            s.drain_events()
                .iter()
                .any(|e| matches!(e, SessionEvent::LevelLost { .. }))
        );
    }

    #[test]
    fn test_win_takes_precedence_on_last_move() {
        let mut cfg = scenario_config();
        cfg.move_budget = 1;
        cfg.score_target = 30;
        let mut s = GameSession::with_board(scenario_board(), cfg, Pacing::instant(), 3);
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        s.run_until_idle();
        assert_eq!(s.moves_remaining(), 0);
        assert_eq!(s.outcome(), LevelOutcome::Won);
    }

    #[test]
    fn test_advance_carries_overflow() {
        let mut cfg = scenario_config();
        cfg.score_target = 20;
        let mut s = GameSession::with_board(scenario_board(), cfg, Pacing::instant(), 3);
        assert_eq!(s.advance_level(), None);
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        s.run_until_idle();
        let earned = s.score();
        let progress = s.advance_level().expect("won");
        assert_eq!(progress.level, 2);
        assert_eq!(progress.total_score, earned);
        assert_eq!(s.score(), earned - 20);
        assert_eq!(s.moves_remaining(), level::level_config(2).move_budget);
        assert_eq!(s.outcome(), LevelOutcome::Playing);
        assert!(find_matches(s.grid()).is_empty());
    }

    #[test]
    fn test_retry_and_restart() {
        let mut cfg = scenario_config();
        cfg.move_budget = 1;
        cfg.score_target = 10_000;
        let mut s = GameSession::with_board(scenario_board(), cfg, Pacing::instant(), 3);
        s.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        s.run_until_idle();
        assert_eq!(s.outcome(), LevelOutcome::Lost);
        s.retry_level();
        assert_eq!(s.score(), 0);
        assert_eq!(s.total_score(), 0);
        assert_eq!(s.level(), 1);
        assert_eq!(s.moves_remaining(), level::level_config(1).move_budget);
        s.restart_from_first_level();
        assert_eq!(s.level(), 1);
        assert_eq!(s.outcome(), LevelOutcome::Playing);
    }

    #[test]
    fn test_new_session_resumes_saved_level() {
        let cfg = GameConfig {
            rows: 8,
            cols: 8,
            seed: Some(5),
            pacing: Pacing::instant(),
        };
        let progress = Progress {
            username: "ada".into(),
            level: 7,
            total_score: 4200,
        };
        let s = GameSession::new(&cfg, &progress);
        assert_eq!(s.level(), 7);
        assert_eq!(s.score(), 0);
        assert_eq!(s.total_score(), 4200);
        assert_eq!(s.player(), "ada");
        assert_eq!(s.level_config().palette_size, 6);
        let mut g = s.grid().clone();
        assert!(solver::is_playable(&mut g));
        assert!(
            g.positions()
                .all(|p| matches!(g.get(p), Some(TileKind::Gem(k)) if k < 6))
        );
    }

    #[test]
    fn test_dead_board_after_cascade_is_reshuffled() {
        let dead = board(&[
            "01230123", "23012301", "01230123", "23012301", "01230123", "23012301", "01230123",
            "23012301",
        ]);
        let mut s =
            GameSession::with_board(dead.clone(), scenario_config(), Pacing::instant(), 21);
        // The refill just landed and left no run and no move.
        s.phase = Phase::Refilled;
        assert_eq!(s.step(), None);
        assert_eq!(s.phase(), &Phase::Idle);

        let events = s.drain_events();
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Shuffled { attempts }, SessionEvent::Settled] if *attempts >= 1
        ));
        assert_ne!(s.grid(), &dead);
        let mut g = s.grid().clone();
        assert!(solver::is_playable(&mut g));
        let mut before = dead.cells().to_vec();
        let mut after = g.cells().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert_eq!(s.outcome(), LevelOutcome::Playing);
    }

    #[test]
    fn test_out_of_range_board_size_is_clamped() {
        for (rows, cols) in [(2, 2), (0, 0), (1, 30)] {
            let cfg = GameConfig {
                rows,
                cols,
                seed: Some(8),
                pacing: Pacing::instant(),
            };
            let s = GameSession::new(&cfg, &Progress::fresh("ada"));
            assert_eq!(s.grid().rows(), crate::MIN_BOARD_SIDE);
            assert_eq!(
                s.grid().cols(),
                cols.clamp(crate::MIN_BOARD_SIDE, crate::MAX_BOARD_SIDE)
            );
            let mut g = s.grid().clone();
            assert!(solver::is_playable(&mut g));
        }
    }

    #[test]
    fn test_tiny_scripted_board_settles_without_shuffling() {
        // 3x1 column: the cascade refills it, but no swap can ever line up three.
        let column = board(&["0", "1", "2"]);
        let mut s =
            GameSession::with_board(column.clone(), scenario_config(), Pacing::instant(), 2);
        s.phase = Phase::Refilled;
        s.step();
        assert_eq!(s.drain_events(), vec![SessionEvent::Settled]);
        assert_eq!(s.grid(), &column);
    }

    /// First right/down swap that yields a match.
    fn find_scoring_swap(grid: &mut Grid) -> Option<(Pos, Pos)> {
        let positions: Vec<Pos> = grid.positions().collect();
        for a in positions {
            for b in [Pos::new(a.row, a.col + 1), Pos::new(a.row + 1, a.col)] {
                if grid.swap(a, b) {
                    let hit = !find_matches(grid).is_empty();
                    grid.swap(a, b);
                    if hit {
                        return Some((a, b));
                    }
                }
            }
        }
        None
    }
}
