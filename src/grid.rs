//! Board model: fixed-size grid of tile kinds, swaps, adjacency and column gravity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest palette a level may use.
pub const MAX_PALETTE: u8 = 9;

/// Tile kind: one of the level palette (`Gem(0..palette)`) or the rare special tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    Gem(u8),
    /// Clears its whole row and column when matched; joins any run as a wildcard.
    Special,
}

impl TileKind {
    #[inline]
    pub fn is_special(self) -> bool {
        matches!(self, Self::Special)
    }

    /// True if the two kinds may sit in the same run.
    #[inline]
    pub fn links_with(self, other: Self) -> bool {
        self == other || self.is_special() || other.is_special()
    }
}

/// Grid coordinate. Row 0 is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Swipe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Playfield: `rows x cols` cells, row-major. `None` only exists while a cascade is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<TileKind>>,
}

impl Grid {
    /// Empty grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Build a full grid from rows of kinds. Rows must share one length.
    pub fn from_rows(rows: Vec<Vec<TileKind>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        debug_assert!(rows.iter().all(|r| r.len() == width), "ragged grid rows");
        let cells = rows.into_iter().flatten().map(Some).collect();
        Self {
            rows: height,
            cols: width,
            cells,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Kind at `pos`, or `None` when empty or out of bounds.
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<TileKind> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)]
    }

    /// Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, pos: Pos, kind: Option<TileKind>) {
        if self.in_bounds(pos) {
            let i = self.index(pos);
            self.cells[i] = kind;
        }
    }

    /// Exchange two cells. Returns false (and does nothing) if either is out of bounds.
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        if !self.in_bounds(a) || !self.in_bounds(b) {
            return false;
        }
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
        true
    }

    /// Manhattan distance exactly 1.
    pub fn is_adjacent(a: Pos, b: Pos) -> bool {
        a.row.abs_diff(b.row) + a.col.abs_diff(b.col) == 1
    }

    /// Neighbour of `pos` in `dir`, if it is on the board.
    pub fn neighbor(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        let next = match dir {
            Direction::Up => Pos::new(pos.row.checked_sub(1)?, pos.col),
            Direction::Down => Pos::new(pos.row + 1, pos.col),
            Direction::Left => Pos::new(pos.row, pos.col.checked_sub(1)?),
            Direction::Right => Pos::new(pos.row, pos.col + 1),
        };
        self.in_bounds(next).then_some(next)
    }

    /// Every coordinate, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Pos::new(row, col)))
    }

    pub fn empty_positions(&self) -> Vec<Pos> {
        self.positions().filter(|&p| self.get(p).is_none()).collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Row-major contents, used by the shuffler.
    pub(crate) fn cells(&self) -> &[Option<TileKind>] {
        &self.cells
    }

    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<Option<TileKind>>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    /// Per-column compaction: tiles slide to the bottom keeping their order, empties end up on top.
    /// Returns how many tiles moved.
    pub fn apply_gravity(&mut self) -> usize {
        let mut moved = 0;
        for col in 0..self.cols {
            let mut write = self.rows;
            for row in (0..self.rows).rev() {
                let pos = Pos::new(row, col);
                if let Some(kind) = self.get(pos) {
                    write -= 1;
                    if write != row {
                        self.set(Pos::new(write, col), Some(kind));
                        self.set(pos, None);
                        moved += 1;
                    }
                }
            }
        }
        moved
    }
}
