//! Tile sampling: match-free initial boards and refill of emptied cells.

use crate::grid::{Grid, Pos, TileKind};
use rand::Rng;

/// Uniform gem from the first `palette` kinds.
pub fn random_gem(rng: &mut impl Rng, palette: u8) -> TileKind {
    TileKind::Gem(rng.random_range(0..palette.max(1)))
}

/// Refill draw: special with probability `special_chance`, otherwise a uniform gem.
pub fn refill_kind(rng: &mut impl Rng, palette: u8, special_chance: f64) -> TileKind {
    if special_chance > 0.0 && rng.random_bool(special_chance.min(1.0)) {
        TileKind::Special
    } else {
        random_gem(rng, palette)
    }
}

/// True if placing `kind` at `pos` would complete a run with the two cells to its left or above.
/// Only cells before `pos` in row-major order are consulted, so it works while filling.
fn completes_run(grid: &Grid, pos: Pos, kind: TileKind) -> bool {
    let left = pos.col >= 2
        && grid.get(Pos::new(pos.row, pos.col - 1)) == Some(kind)
        && grid.get(Pos::new(pos.row, pos.col - 2)) == Some(kind);
    let above = pos.row >= 2
        && grid.get(Pos::new(pos.row - 1, pos.col)) == Some(kind)
        && grid.get(Pos::new(pos.row - 2, pos.col)) == Some(kind);
    left || above
}

/// Fresh board with no runs. Specials never appear here.
pub fn generate_board(rows: usize, cols: usize, palette: u8, rng: &mut impl Rng) -> Grid {
    let mut grid = Grid::new(rows, cols);
    for row in 0..rows {
        for col in 0..cols {
            let pos = Pos::new(row, col);
            let allowed: Vec<TileKind> = (0..palette)
                .map(TileKind::Gem)
                .filter(|&k| !completes_run(&grid, pos, k))
                .collect();
            // At most two kinds are ever excluded, so palettes of 3+ always leave a choice.
            let kind = if allowed.is_empty() {
                random_gem(rng, palette)
            } else {
                allowed[rng.random_range(0..allowed.len())]
            };
            grid.set(pos, Some(kind));
        }
    }
    grid
}

/// Fill every empty cell. Returns the positions that were filled, row-major.
pub fn refill(grid: &mut Grid, palette: u8, special_chance: f64, rng: &mut impl Rng) -> Vec<Pos> {
    let empties = grid.empty_positions();
    for &pos in &empties {
        grid.set(pos, Some(refill_kind(rng, palette, special_chance)));
    }
    empties
}
