//! Special-token effects
//!
//! Bombs and color-clear resolve to a cell set in one step. The snake resolves
//! to an ordered path that the engine consumes one cell per tick.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::rng::SimpleRng;
use crate::scoring::score_for_chain;
use crate::types::{BombOrientation, Coord, TokenValue, GRID_COLS, GRID_ROWS, SNAKE_PATH_LEN};

/// Cells cleared by an atomic effect and the points it is worth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectResult {
    pub cells: Vec<Coord>,
    pub score: u32,
}

impl EffectResult {
    fn scored(mut cells: Vec<Coord>) -> Self {
        cells.sort();
        cells.dedup();
        let score = score_for_chain(cells.len());
        Self { cells, score }
    }
}

/// Ordered snake path, first cell is the destination
pub type SnakePath = ArrayVec<Coord, SNAKE_PATH_LEN>;

pub fn bomb_cells(orientation: BombOrientation, dest: Coord) -> Vec<Coord> {
    let row = (0..GRID_COLS as i8).map(|col| Coord::new(dest.row, col));
    let column = (0..GRID_ROWS as i8).map(|r| Coord::new(r, dest.col));
    let mut cells: Vec<Coord> = match orientation {
        BombOrientation::Row => row.collect(),
        BombOrientation::Column => column.collect(),
        BombOrientation::Cross => row.chain(column).collect(),
    };
    cells.sort();
    cells.dedup();
    cells
}

/// Every cell holding `Normal(color)`, plus `dest`
///
/// `dest` is where the color-clear token landed, so the effect is never empty
/// and always consumes the token.
pub fn color_clear_cells(grid: &Grid, color: u8, dest: Coord) -> Vec<Coord> {
    let mut cells: Vec<Coord> = grid
        .iter()
        .filter(|&(_, token)| token == TokenValue::Normal(color))
        .map(|(coord, _)| coord)
        .collect();
    if Grid::in_bounds(dest) {
        cells.push(dest);
    }
    cells.sort();
    cells.dedup();
    cells
}

pub fn resolve_bomb(orientation: BombOrientation, dest: Coord) -> EffectResult {
    EffectResult::scored(bomb_cells(orientation, dest))
}

pub fn resolve_color_clear(grid: &Grid, color: u8, dest: Coord) -> EffectResult {
    EffectResult::scored(color_clear_cells(grid, color, dest))
}

fn neighbours(cell: Coord) -> ArrayVec<Coord, 4> {
    [(-1, 0), (1, 0), (0, -1), (0, 1)]
        .iter()
        .map(|&(dr, dc)| cell.offset(dr, dc))
        .filter(|&n| Grid::in_bounds(n))
        .collect()
}

/// Random walk of up to `steps` cells starting at `start`.
///
/// Each step picks a shuffled in-bounds neighbour, preferring cells not yet on
/// the path, and only steps back onto the previous cell when it is the sole
/// neighbour. `steps` is capped at `SNAKE_PATH_LEN`.
pub fn snake_path(rng: &mut SimpleRng, start: Coord, steps: usize) -> SnakePath {
    let mut path = SnakePath::new();
    if !Grid::in_bounds(start) || steps == 0 {
        return path;
    }
    path.push(start);

    while path.len() < steps.min(SNAKE_PATH_LEN) {
        let current = path[path.len() - 1];
        let previous = path.len().checked_sub(2).map(|i| path[i]);

        let mut options = neighbours(current);
        rng.shuffle(&mut options);

        let next = options
            .iter()
            .copied()
            .find(|n| !path.contains(n))
            .or_else(|| options.iter().copied().find(|&n| Some(n) != previous))
            .or(previous);

        match next {
            Some(cell) => path.push(cell),
            None => break,
        }
    }
    path
}
