//! Swap legality and effect classification
//!
//! Rules, first match wins:
//! 1. Either cell holds a bomb or snake: always legal, the power token fires.
//! 2. Either cell holds a color-clear and the other a plain color: legal,
//!    every cell of that color is cleared.
//! 3. Either cell holds a wildcard: illegal. A wildcard cannot start a move.
//! 4. Otherwise the swap is legal only if it produces a match.
//!
//! None of these functions leave the grid modified.

use serde::Serialize;

use crate::catalog::TokenClass;
use crate::grid::Grid;
use crate::matcher::has_any_match;
use crate::types::{BombOrientation, Coord, TokenValue};

/// Why a swap request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectReason {
    /// Out of bounds or not adjacent
    InvalidSwap,
    /// A cascade or snake is still resolving
    EngineBusy,
    RoundOver,
    WildcardLocked,
    NoMatch,
}

impl RejectReason {
    pub fn code(self) -> &'static str {
        match self {
            RejectReason::InvalidSwap => "invalid_swap",
            RejectReason::EngineBusy => "engine_busy",
            RejectReason::RoundOver => "round_over",
            RejectReason::WildcardLocked | RejectReason::NoMatch => "illegal_swap",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RejectReason::InvalidSwap => "cells are out of bounds or not adjacent",
            RejectReason::EngineBusy => "the grid is still resolving",
            RejectReason::RoundOver => "the round is over",
            RejectReason::WildcardLocked => "a wildcard cannot be swapped on its own",
            RejectReason::NoMatch => "swap does not produce a match",
        }
    }
}

/// What an adjacent swap would do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapClass {
    Bomb {
        orientation: BombOrientation,
        dest: Coord,
    },
    Snake {
        dest: Coord,
    },
    ColorClear {
        color: u8,
        dest: Coord,
    },
    /// Plain swap that creates at least one match
    Match,
    Rejected(RejectReason),
}

impl SwapClass {
    pub fn is_legal(&self) -> bool {
        !matches!(self, SwapClass::Rejected(_))
    }
}

/// Both cells in bounds and at Manhattan distance 1
pub fn are_adjacent(a: Coord, b: Coord) -> bool {
    Grid::in_bounds(a) && Grid::in_bounds(b) && a.is_adjacent(b)
}

/// Swap, scan, swap back.
pub fn would_match_after_swap(grid: &mut Grid, a: Coord, b: Coord, color_count: u8) -> bool {
    if grid.swap(a, b).is_err() {
        return false;
    }
    let matched = has_any_match(grid, color_count);
    // Undo cannot fail: both cells were just swapped in bounds.
    let _ = grid.swap(a, b);
    matched
}

pub fn classify_swap(grid: &mut Grid, a: Coord, b: Coord, color_count: u8) -> SwapClass {
    if !are_adjacent(a, b) {
        return SwapClass::Rejected(RejectReason::InvalidSwap);
    }
    let (Some(ta), Some(tb)) = (grid.cell(a), grid.cell(b)) else {
        return SwapClass::Rejected(RejectReason::InvalidSwap);
    };

    // Rule 1: the power token fires at the other cell. With two power tokens
    // the second one fires at its own cell.
    if ta.is_power() || tb.is_power() {
        let (power, dest) = if tb.is_power() && !ta.is_power() {
            (tb, a)
        } else if ta.is_power() && !tb.is_power() {
            (ta, b)
        } else {
            (tb, b)
        };
        return match power {
            TokenValue::Bomb(orientation) => SwapClass::Bomb { orientation, dest },
            _ => SwapClass::Snake { dest },
        };
    }

    // Rule 2
    let (ca, cb) = (TokenClass::of(ta, color_count), TokenClass::of(tb, color_count));
    match (ca, cb) {
        (TokenClass::ColorClear, TokenClass::Color(color)) => {
            return SwapClass::ColorClear { color, dest: b };
        }
        (TokenClass::Color(color), TokenClass::ColorClear) => {
            return SwapClass::ColorClear { color, dest: a };
        }
        _ => {}
    }

    // Rule 3
    if ca == TokenClass::Wildcard || cb == TokenClass::Wildcard {
        return SwapClass::Rejected(RejectReason::WildcardLocked);
    }

    // Rule 4
    if would_match_after_swap(grid, a, b, color_count) {
        SwapClass::Match
    } else {
        SwapClass::Rejected(RejectReason::NoMatch)
    }
}

/// First legal adjacent pair in row-major order, right neighbour before
/// down neighbour.
pub fn find_move(grid: &Grid, color_count: u8) -> Option<(Coord, Coord)> {
    let mut scratch = grid.clone();
    for a in Grid::coords() {
        for b in [a.offset(0, 1), a.offset(1, 0)] {
            if !Grid::in_bounds(b) {
                continue;
            }
            if classify_swap(&mut scratch, a, b, color_count).is_legal() {
                return Some((a, b));
            }
        }
    }
    None
}

pub fn has_moves(grid: &Grid, color_count: u8) -> bool {
    find_move(grid, color_count).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Diagonal stripes, three colors, no matches and few moves
    fn stripes() -> Grid {
        let mut g = Grid::new();
        for coord in Grid::coords() {
            let color = (coord.row + 2 * coord.col) % 3;
            g.set(coord, TokenValue::Normal(color as u8)).unwrap();
        }
        g
    }

    #[test]
    fn test_adjacency() {
        assert!(are_adjacent(Coord::new(0, 0), Coord::new(0, 1)));
        assert!(are_adjacent(Coord::new(4, 4), Coord::new(5, 4)));
        assert!(!are_adjacent(Coord::new(4, 4), Coord::new(5, 5)));
        assert!(!are_adjacent(Coord::new(4, 4), Coord::new(4, 4)));
        assert!(!are_adjacent(Coord::new(8, 8), Coord::new(8, 9)));
    }

    #[test]
    fn test_invalid_pairs() {
        let mut g = stripes();
        assert_eq!(
            classify_swap(&mut g, Coord::new(0, 0), Coord::new(2, 0), 6),
            SwapClass::Rejected(RejectReason::InvalidSwap)
        );
        assert_eq!(
            classify_swap(&mut g, Coord::new(-1, 0), Coord::new(0, 0), 6),
            SwapClass::Rejected(RejectReason::InvalidSwap)
        );
    }

    #[test]
    fn test_bomb_destination_is_the_other_cell() {
        let mut g = stripes();
        g.set(Coord::new(2, 2), TokenValue::Bomb(BombOrientation::Row)).unwrap();
        assert_eq!(
            classify_swap(&mut g, Coord::new(2, 2), Coord::new(2, 3), 6),
            SwapClass::Bomb {
                orientation: BombOrientation::Row,
                dest: Coord::new(2, 3)
            }
        );
        assert_eq!(
            classify_swap(&mut g, Coord::new(1, 2), Coord::new(2, 2), 6),
            SwapClass::Bomb {
                orientation: BombOrientation::Row,
                dest: Coord::new(1, 2)
            }
        );
    }

    #[test]
    fn test_two_power_tokens_use_the_second() {
        let mut g = stripes();
        g.set(Coord::new(5, 5), TokenValue::Bomb(BombOrientation::Column)).unwrap();
        g.set(Coord::new(5, 6), TokenValue::Snake).unwrap();
        assert_eq!(
            classify_swap(&mut g, Coord::new(5, 5), Coord::new(5, 6), 6),
            SwapClass::Snake {
                dest: Coord::new(5, 6)
            }
        );
        assert_eq!(
            classify_swap(&mut g, Coord::new(5, 6), Coord::new(5, 5), 6),
            SwapClass::Bomb {
                orientation: BombOrientation::Column,
                dest: Coord::new(5, 5)
            }
        );
    }

    #[test]
    fn test_power_token_beats_wildcard() {
        let mut g = stripes();
        g.set(Coord::new(0, 0), TokenValue::Snake).unwrap();
        g.set(Coord::new(0, 1), TokenValue::Wildcard).unwrap();
        assert_eq!(
            classify_swap(&mut g, Coord::new(0, 0), Coord::new(0, 1), 6),
            SwapClass::Snake {
                dest: Coord::new(0, 1)
            }
        );
    }

    #[test]
    fn test_color_clear_targets_plain_color() {
        let mut g = stripes();
        g.set(Coord::new(3, 3), TokenValue::ColorClear).unwrap();
        let other = g.get(Coord::new(3, 4)).unwrap();
        let TokenValue::Normal(color) = other else {
            panic!("stripes should hold plain colors");
        };
        assert_eq!(
            classify_swap(&mut g, Coord::new(3, 3), Coord::new(3, 4), 6),
            SwapClass::ColorClear {
                color,
                dest: Coord::new(3, 4)
            }
        );
    }

    #[test]
    fn test_color_clear_against_wildcard_is_locked() {
        let mut g = stripes();
        g.set(Coord::new(3, 3), TokenValue::ColorClear).unwrap();
        g.set(Coord::new(3, 4), TokenValue::Wildcard).unwrap();
        assert_eq!(
            classify_swap(&mut g, Coord::new(3, 3), Coord::new(3, 4), 6),
            SwapClass::Rejected(RejectReason::WildcardLocked)
        );
    }

    #[test]
    fn test_wildcard_cannot_start_a_move() {
        // Moving the wildcard right would complete D * D, but it is still locked
        let mut g = stripes();
        g.set(Coord::new(4, 0), TokenValue::Normal(3)).unwrap();
        g.set(Coord::new(4, 1), TokenValue::Wildcard).unwrap();
        g.set(Coord::new(4, 3), TokenValue::Normal(3)).unwrap();
        assert_eq!(
            classify_swap(&mut g, Coord::new(4, 1), Coord::new(4, 2), 6),
            SwapClass::Rejected(RejectReason::WildcardLocked)
        );
    }

    #[test]
    fn test_match_swap_and_grid_left_unchanged() {
        let mut g = stripes();
        // D D . D on row 6 with the gap filled by the cell below
        g.set(Coord::new(6, 0), TokenValue::Normal(3)).unwrap();
        g.set(Coord::new(6, 1), TokenValue::Normal(3)).unwrap();
        g.set(Coord::new(7, 2), TokenValue::Normal(3)).unwrap();
        let before = g.clone();
        assert_eq!(
            classify_swap(&mut g, Coord::new(6, 2), Coord::new(7, 2), 6),
            SwapClass::Match
        );
        assert_eq!(g, before);
    }

    #[test]
    fn test_no_match_swap_leaves_grid_unchanged() {
        let mut g = stripes();
        let before = g.clone();
        assert_eq!(
            classify_swap(&mut g, Coord::new(0, 0), Coord::new(0, 1), 6),
            SwapClass::Rejected(RejectReason::NoMatch)
        );
        assert_eq!(g, before);
    }

    #[test]
    fn test_find_move_row_major() {
        let mut g = stripes();
        g.set(Coord::new(6, 0), TokenValue::Normal(3)).unwrap();
        g.set(Coord::new(6, 1), TokenValue::Normal(3)).unwrap();
        g.set(Coord::new(7, 2), TokenValue::Normal(3)).unwrap();
        assert!(has_moves(&g, 6));
        assert_eq!(find_move(&g, 6), Some((Coord::new(6, 2), Coord::new(7, 2))));
    }

    #[test]
    fn test_reject_codes() {
        assert_eq!(RejectReason::NoMatch.code(), "illegal_swap");
        assert_eq!(RejectReason::WildcardLocked.code(), "illegal_swap");
        assert_eq!(RejectReason::EngineBusy.code(), "engine_busy");
        assert!(!RejectReason::RoundOver.message().is_empty());
    }
}
