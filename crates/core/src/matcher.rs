//! Match detection
//!
//! Two scans share one run walker:
//! - [`find_matches`] is the gameplay scan. For every base color it walks rows
//!   and columns, letting wildcards stand in for that color.
//! - [`find_exact_matches`] only joins identical plain colors; wildcards end a
//!   run there.
//!
//! A run that is nothing but wildcards never forms a group.

use serde::Serialize;

use crate::catalog::TokenClass;
use crate::grid::Grid;
use crate::types::{Coord, GRID_COLS, GRID_ROWS, MIN_RUN};

/// A matched run. Cells are sorted and unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchGroup {
    cells: Vec<Coord>,
}

impl MatchGroup {
    fn from_run(mut cells: Vec<Coord>) -> Self {
        cells.sort();
        cells.dedup();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.binary_search(&coord).is_ok()
    }
}

#[derive(Clone, Copy)]
enum ScanMode {
    Exact,
    AnyBase,
}

/// Does `class` continue a run of `base` under `mode`?
fn joins(class: TokenClass, base: u8, mode: ScanMode) -> bool {
    match (class, mode) {
        (TokenClass::Color(c), _) => c == base,
        (TokenClass::Wildcard, ScanMode::AnyBase) => true,
        _ => false,
    }
}

/// Walk one line of cells and push every qualifying run of `base`.
fn scan_line<I>(
    grid: &Grid,
    line: I,
    base: u8,
    color_count: u8,
    mode: ScanMode,
    out: &mut Vec<MatchGroup>,
) where
    I: Iterator<Item = Coord>,
{
    let mut run: Vec<Coord> = Vec::new();
    let mut has_base = false;

    let mut flush = |run: &mut Vec<Coord>, has_base: &mut bool| {
        if run.len() >= MIN_RUN && *has_base {
            out.push(MatchGroup::from_run(std::mem::take(run)));
        } else {
            run.clear();
        }
        *has_base = false;
    };

    for coord in line {
        let class = grid
            .cell(coord)
            .map(|token| TokenClass::of(token, color_count))
            .unwrap_or(TokenClass::Empty);
        if joins(class, base, mode) {
            has_base |= class == TokenClass::Color(base);
            run.push(coord);
        } else {
            flush(&mut run, &mut has_base);
        }
    }
    flush(&mut run, &mut has_base);
}

fn scan(grid: &Grid, color_count: u8, mode: ScanMode) -> Vec<MatchGroup> {
    let mut groups = Vec::new();
    for base in 0..color_count {
        for row in 0..GRID_ROWS as i8 {
            let line = (0..GRID_COLS as i8).map(move |col| Coord::new(row, col));
            scan_line(grid, line, base, color_count, mode, &mut groups);
        }
        for col in 0..GRID_COLS as i8 {
            let line = (0..GRID_ROWS as i8).map(move |row| Coord::new(row, col));
            scan_line(grid, line, base, color_count, mode, &mut groups);
        }
    }
    groups
}

/// Wildcard-extended scan used by gameplay.
///
/// Overlapping bases produce independent groups; a wildcard shared by two
/// runs appears in both.
pub fn find_matches(grid: &Grid, color_count: u8) -> Vec<MatchGroup> {
    scan(grid, color_count, ScanMode::AnyBase)
}

/// Strict scan: identical plain colors only.
pub fn find_exact_matches(grid: &Grid, color_count: u8) -> Vec<MatchGroup> {
    scan(grid, color_count, ScanMode::Exact)
}

pub fn has_any_match(grid: &Grid, color_count: u8) -> bool {
    !find_matches(grid, color_count).is_empty()
}

/// Sorted union of every group's cells
pub fn union_cells(groups: &[MatchGroup]) -> Vec<Coord> {
    let mut cells: Vec<Coord> = groups.iter().flat_map(|g| g.cells.iter().copied()).collect();
    cells.sort();
    cells.dedup();
    cells
}
