//! Dead-board detection and reshuffle.

use crate::grid::{Grid, Pos};
use crate::matcher::find_matches;
use crate::spawn;
use rand::Rng;
use rand::seq::SliceRandom;

/// Permutations of one tile multiset tried before its contents are redrawn.
pub const MAX_SHUFFLE_ATTEMPTS: u32 = 1000;

/// Whether a `rows` x `cols` board has room for any swap to line up three.
///
/// A 1x4 line or a 2x3 block is the smallest shape that can; 2x2 and 1x3 cannot.
pub fn can_offer_moves(rows: usize, cols: usize) -> bool {
    let (short, long) = (rows.min(cols), rows.max(cols));
    short >= 1 && (long >= 4 || (long >= 3 && short >= 2))
}

/// True if some swap with a right or bottom neighbour would produce a match.
///
/// Each trial swap is undone before the next, so `grid` is unchanged on return.
pub fn has_potential_match(grid: &mut Grid) -> bool {
    let positions: Vec<Pos> = grid.positions().collect();
    for pos in positions {
        let right = Pos::new(pos.row, pos.col + 1);
        let below = Pos::new(pos.row + 1, pos.col);
        for other in [right, below] {
            if !grid.swap(pos, other) {
                continue;
            }
            let found = !find_matches(grid).is_empty();
            grid.swap(pos, other);
            if found {
                return true;
            }
        }
    }
    false
}

/// A board is settled-playable when it holds no run and offers at least one.
pub fn is_playable(grid: &mut Grid) -> bool {
    find_matches(grid).is_empty() && has_potential_match(grid)
}

/// Random permutation of `grid`'s contents with no immediate match and at least one potential
/// match. `grid` itself is never touched; the caller commits the returned candidate.
///
/// Candidates are permutations of the same tiles. If `MAX_SHUFFLE_ATTEMPTS` permutations in a
/// row fail, the tiles are redrawn from `palette` and shuffling continues on the new set.
/// Callers check [`can_offer_moves`] first; on smaller boards this never returns.
pub fn shuffle(grid: &Grid, palette: u8, rng: &mut impl Rng) -> (Grid, u32) {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut tiles: Vec<_> = grid.cells().to_vec();
    let mut attempts = 0u32;
    loop {
        for _ in 0..MAX_SHUFFLE_ATTEMPTS {
            attempts += 1;
            tiles.shuffle(rng);
            let mut candidate = Grid::from_cells(rows, cols, tiles.clone());
            if is_playable(&mut candidate) {
                return (candidate, attempts);
            }
        }
        log::debug!("shuffle: {} permutations rejected, redrawing tiles", MAX_SHUFFLE_ATTEMPTS);
        for tile in &mut tiles {
            *tile = Some(spawn::random_gem(rng, palette));
        }
    }
}
