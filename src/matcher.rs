//! Match detection: runs of three or more along rows and columns, plus special-tile expansion.

use crate::grid::{Grid, Pos, TileKind};
use std::collections::BTreeSet;

/// Shortest run that counts as a match.
pub const MIN_RUN: usize = 3;

/// All positions that belong to any run of `MIN_RUN` or more, after special expansion.
///
/// Overlapping runs merge into one set. A matched special tile pulls in its entire row and
/// column; specials reached that way expand too, until nothing new is added.
pub fn find_matches(grid: &Grid) -> BTreeSet<Pos> {
    let mut matched = BTreeSet::new();
    for row in 0..grid.rows() {
        let line: Vec<Pos> = (0..grid.cols()).map(|col| Pos::new(row, col)).collect();
        mark_runs(grid, &line, &mut matched);
    }
    for col in 0..grid.cols() {
        let line: Vec<Pos> = (0..grid.rows()).map(|row| Pos::new(row, col)).collect();
        mark_runs(grid, &line, &mut matched);
    }
    expand_specials(grid, &mut matched);
    matched
}

/// Mark every window of linkable tiles of length >= `MIN_RUN` in one line.
///
/// Specials link with any kind, so the longest window is measured from every start rather
/// than by splitting the line greedily (`1 1 * 2 2` holds two runs sharing the special).
fn mark_runs(grid: &Grid, line: &[Pos], out: &mut BTreeSet<Pos>) {
    for start in 0..line.len() {
        let Some(first) = grid.get(line[start]) else {
            continue;
        };
        let mut anchor = (!first.is_special()).then_some(first);
        let mut end = start + 1;
        while end < line.len() {
            let Some(kind) = grid.get(line[end]) else {
                break;
            };
            match anchor {
                Some(a) if !a.links_with(kind) => break,
                None if !kind.is_special() => anchor = Some(kind),
                _ => {}
            }
            end += 1;
        }
        if end - start >= MIN_RUN {
            out.extend(&line[start..end]);
        }
    }
}

fn expand_specials(grid: &Grid, matched: &mut BTreeSet<Pos>) {
    let mut expanded: BTreeSet<Pos> = BTreeSet::new();
    loop {
        let pending: Vec<Pos> = matched
            .iter()
            .copied()
            .filter(|&p| grid.get(p) == Some(TileKind::Special) && !expanded.contains(&p))
            .collect();
        if pending.is_empty() {
            break;
        }
        for special in pending {
            expanded.insert(special);
            let row = (0..grid.cols()).map(|col| Pos::new(special.row, col));
            let col = (0..grid.rows()).map(|row| Pos::new(row, special.col));
            matched.extend(row.chain(col).filter(|&p| grid.get(p).is_some()));
        }
    }
}
