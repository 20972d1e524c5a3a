use serde::Serialize;

use crate::cascade::EngineState;
use crate::grid::Grid;
use crate::types::{Difficulty, TokenValue, GRID_COLS, GRID_ROWS};

/// Copy of the grid handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct GridSnapshot {
    pub cells: [[TokenValue; GRID_COLS as usize]; GRID_ROWS as usize],
}

impl GridSnapshot {
    pub fn capture(grid: &Grid) -> Self {
        let mut snapshot = Self::default();
        grid.write_rows(&mut snapshot.cells);
        snapshot
    }

    /// One glyph string per row
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(TokenValue::glyph).collect())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GameSnapshot {
    pub grid: GridSnapshot,
    pub score: u32,
    pub state: EngineState,
    /// `None` in untimed rounds
    pub remaining_ms: Option<u32>,
    pub difficulty: Difficulty,
    pub round: u32,
    pub swaps: u32,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playable(&self) -> bool {
        !self.game_over && self.state == EngineState::Idle
    }
}
