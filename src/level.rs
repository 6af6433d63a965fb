//! Level tiers and completion rules.

/// Points per cleared cell.
pub const SCORE_PER_TILE: u32 = 10;

/// Per-level parameters. A pure function of the level number, see [`level_config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    pub palette_size: u8,
    pub move_budget: u32,
    pub score_target: u32,
    pub special_spawn_chance: f64,
}

/// Where a level stands after the last settled cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelOutcome {
    #[default]
    Playing,
    Won,
    Lost,
}

/// Tier table: (last level of tier, palette, moves, special chance).
const TIERS: [(u32, u8, u32, f64); 6] = [
    (3, 4, 25, 0.05),
    (6, 5, 22, 0.04),
    (10, 6, 20, 0.03),
    (15, 7, 18, 0.02),
    (20, 8, 16, 0.02),
    (u32::MAX, 9, 15, 0.01),
];

/// Parameters for `level` (levels below 1 are treated as 1).
pub fn level_config(level: u32) -> LevelConfig {
    let level = level.max(1);
    let (_, palette_size, move_budget, special_spawn_chance) = TIERS
        .iter()
        .copied()
        .find(|&(last, ..)| level <= last)
        .unwrap_or(TIERS[TIERS.len() - 1]);
    LevelConfig {
        palette_size,
        move_budget,
        score_target: 500u32.saturating_add(level.saturating_mul(250)),
        special_spawn_chance,
    }
}

/// Won beats lost when both thresholds are crossed by the same move.
pub fn completion(score: u32, moves_remaining: u32, config: &LevelConfig) -> LevelOutcome {
    if score >= config.score_target {
        LevelOutcome::Won
    } else if moves_remaining == 0 {
        LevelOutcome::Lost
    } else {
        LevelOutcome::Playing
    }
}

/// Score the next level starts with after clearing `config` with `score`.
pub fn overflow(score: u32, config: &LevelConfig) -> u32 {
    score.saturating_sub(config.score_target)
}
