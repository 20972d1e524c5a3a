//! Click-to-select input protocol
//!
//! Maps a stream of cell clicks onto swap requests the way a pointer-driven
//! front end expects: pick a cell, then pick a neighbour to swap with it.

use crate::cascade::{CascadeEngine, SwapOutcome};
use crate::catalog::TokenSource;
use crate::grid::Grid;
use crate::swap::{are_adjacent, RejectReason};
use crate::types::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    selected: Option<Coord>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Handle a click. `None` (or an off-grid cell) clears the selection.
    ///
    /// Returns the engine's answer when the click produced a swap request.
    pub fn click<S: TokenSource>(
        &mut self,
        engine: &mut CascadeEngine<S>,
        cell: Option<Coord>,
    ) -> Option<SwapOutcome> {
        let Some(cell) = cell.filter(|&c| Grid::in_bounds(c)) else {
            self.selected = None;
            return None;
        };

        let Some(current) = self.selected else {
            self.selected = Some(cell);
            return None;
        };

        if current == cell {
            self.selected = None;
            return None;
        }

        if !are_adjacent(current, cell) {
            self.selected = Some(cell);
            return None;
        }

        let outcome = engine.request_swap(current, cell);
        self.selected = match outcome {
            // Let the player try another neighbour from the cell they just hit
            SwapOutcome::Rejected(RejectReason::NoMatch) => Some(cell),
            _ => None,
        };
        Some(outcome)
    }
}
