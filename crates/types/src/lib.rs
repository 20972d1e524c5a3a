//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behavior beyond classification and
//! text encoding, making them usable from the core, a front end, or tooling.
//!
//! # Grid Dimensions
//!
//! - **Rows**: 9 (indexed 0-8, row 0 is the top)
//! - **Columns**: 9 (indexed 0-8)
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds and are *hints* for the presentation
//! layer, except the snake step delay which paces a multi-tick effect:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Suggested fixed timestep (~60 FPS) |
//! | `HIGHLIGHT_DELAY_MS` | 600 | How long a matched/affected group is shown before removal |
//! | `SNAKE_STEP_DELAY_MS` | 120 | Delay between two snake path cells |
//!
//! # Unlock Thresholds
//!
//! | Score | Unlocks |
//! |-------|---------|
//! | 1000 | Wildcards in the refill pool |
//! | 1500 | Bomb drop-ins |
//! | 3000 | Snake drop-ins |
//! | 6000 | Color-clear tokens in the refill pool |
//! | 8000 | Bombs in the refill pool (25% of draws) |
//!
//! # Examples
//!
//! ```
//! use bubble_pop_types::{BombOrientation, Difficulty, TokenValue, GRID_COLS, GRID_ROWS};
//!
//! let token = TokenValue::from_glyph('+').unwrap();
//! assert_eq!(token, TokenValue::Bomb(BombOrientation::Cross));
//! assert_eq!(token.glyph(), '+');
//!
//! assert_eq!(Difficulty::from_str("hard"), Some(Difficulty::Hard));
//! assert_eq!(Difficulty::Hard.duration_secs(), Some(60));
//!
//! assert_eq!(GRID_ROWS, 9);
//! assert_eq!(GRID_COLS, 9);
//! ```

use serde::{Deserialize, Serialize};

/// Grid height in cells (9 rows)
pub const GRID_ROWS: u8 = 9;

/// Grid width in cells (9 columns)
pub const GRID_COLS: u8 = 9;

/// Minimum run length that forms a match
pub const MIN_RUN: usize = 3;

/// Suggested fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Highlight duration for a resolution step before its cells are removed
pub const HIGHLIGHT_DELAY_MS: u32 = 600;

/// Delay between two consecutive snake cells
pub const SNAKE_STEP_DELAY_MS: u32 = 120;

/// Number of cells a snake clears
pub const SNAKE_PATH_LEN: usize = 10;

/// Default number of normal colors in the catalog
pub const DEFAULT_COLOR_COUNT: u8 = 6;

/// Smallest supported catalog (fewer colors cannot avoid starting matches)
pub const MIN_COLOR_COUNT: u8 = 3;

/// Largest supported catalog (glyphs `A`-`H`)
pub const MAX_COLOR_COUNT: u8 = 8;

/// Refill pool weight of each normal color
pub const NORMAL_COLOR_WEIGHT: usize = 10;

pub const WILDCARD_UNLOCK_SCORE: u32 = 1000;
pub const COLOR_CLEAR_UNLOCK_SCORE: u32 = 6000;
pub const RARE_UNLOCK_SCORE: u32 = 8000;

/// Chance (percent) that a bomb enters the pool for one draw once rare tokens unlock
pub const RARE_DRAW_PERCENT: u32 = 25;

pub const DROP_IN_UNLOCK_SCORE: u32 = 1500;
pub const SNAKE_UNLOCK_SCORE: u32 = 3000;

/// Scoring steps between two power-token drop-ins
pub const DROP_IN_INTERVAL_STEPS: u32 = 40;

/// Time bonus per scoring step, in milliseconds per second of round duration
pub const TIME_BONUS_MS_PER_DURATION_SEC: u32 = 15;

/// Upper bound on chained resolution steps after one swap
pub const MAX_CASCADE_STEPS: u32 = 256;


/// A cell position: `row` counts down from the top, `col` right from the left.
///
/// Signed so that neighbour arithmetic at the edges produces an
/// out-of-bounds coordinate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Offset by `(dr, dc)`; the result may be out of bounds
    pub fn offset(self, dr: i8, dc: i8) -> Self {
        Self {
            row: self.row.saturating_add(dr),
            col: self.col.saturating_add(dc),
        }
    }

    /// Manhattan distance between two cells
    pub fn distance(self, other: Coord) -> u16 {
        let dr = (self.row as i16 - other.row as i16).unsigned_abs();
        let dc = (self.col as i16 - other.col as i16).unsigned_abs();
        dr + dc
    }

    /// True if the cells share an edge (Manhattan distance 1)
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.distance(other) == 1
    }
}

/// Clearing pattern of a bomb token
///
/// - **Row**: the whole row of the destination cell
/// - **Column**: the whole column of the destination cell
/// - **Cross**: union of both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BombOrientation {
    Row,
    Column,
    Cross,
}

impl BombOrientation {
    pub const ALL: [BombOrientation; 3] = [
        BombOrientation::Row,
        BombOrientation::Column,
        BombOrientation::Cross,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BombOrientation::Row => "row",
            BombOrientation::Column => "column",
            BombOrientation::Cross => "cross",
        }
    }
}

/// The value held by one grid cell
///
/// `Normal` carries a color id; all other kinds are singletons except `Bomb`,
/// which carries its orientation. `Empty` only exists between removal and
/// refill. `Blocker` is never drawn by refill; it stands for any reserved or
/// out-of-catalog value and terminates every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TokenValue {
    #[default]
    Empty,
    Normal(u8),
    Wildcard,
    ColorClear,
    Bomb(BombOrientation),
    Snake,
    Blocker,
}

impl TokenValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, TokenValue::Empty)
    }

    /// Bombs and snakes: tokens that activate on any swap
    pub fn is_power(&self) -> bool {
        matches!(self, TokenValue::Bomb(_) | TokenValue::Snake)
    }

    /// Anything that is not a plain color or empty
    pub fn is_special(&self) -> bool {
        !matches!(self, TokenValue::Empty | TokenValue::Normal(_))
    }

    /// Color id if this is a plain color inside a catalog of `color_count` colors
    pub fn normal_color(&self, color_count: u8) -> Option<u8> {
        match *self {
            TokenValue::Normal(c) if c < color_count => Some(c),
            _ => None,
        }
    }

    /// One-character text encoding used by fixtures and logs
    ///
    /// # Examples
    ///
    /// ```
    /// use bubble_pop_types::TokenValue;
    ///
    /// assert_eq!(TokenValue::Normal(0).glyph(), 'A');
    /// assert_eq!(TokenValue::Normal(2).glyph(), 'C');
    /// assert_eq!(TokenValue::Wildcard.glyph(), '*');
    /// assert_eq!(TokenValue::Empty.glyph(), '.');
    /// ```
    pub fn glyph(&self) -> char {
        match *self {
            TokenValue::Empty => '.',
            TokenValue::Normal(c) if c < MAX_COLOR_COUNT => (b'A' + c) as char,
            TokenValue::Normal(_) => '#',
            TokenValue::Wildcard => '*',
            TokenValue::ColorClear => '@',
            TokenValue::Bomb(BombOrientation::Row) => '-',
            TokenValue::Bomb(BombOrientation::Column) => '|',
            TokenValue::Bomb(BombOrientation::Cross) => '+',
            TokenValue::Snake => '~',
            TokenValue::Blocker => '#',
        }
    }

    /// Parse a glyph produced by [`TokenValue::glyph`]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(TokenValue::Empty),
            'A'..='H' => Some(TokenValue::Normal(glyph as u8 - b'A')),
            '*' => Some(TokenValue::Wildcard),
            '@' => Some(TokenValue::ColorClear),
            '-' => Some(TokenValue::Bomb(BombOrientation::Row)),
            '|' => Some(TokenValue::Bomb(BombOrientation::Column)),
            '+' => Some(TokenValue::Bomb(BombOrientation::Cross)),
            '~' => Some(TokenValue::Snake),
            '#' => Some(TokenValue::Blocker),
            _ => None,
        }
    }
}

/// Round length presets
///
/// The label returned by [`Difficulty::as_str`] is the key persistence layers
/// store best scores under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    FreePlay,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::FreePlay,
    ];

    /// Round length in seconds, `None` for untimed play
    pub fn duration_secs(&self) -> Option<u32> {
        match self {
            Difficulty::Easy => Some(150),
            Difficulty::Normal => Some(110),
            Difficulty::Hard => Some(60),
            Difficulty::FreePlay => None,
        }
    }

    pub fn duration_ms(&self) -> Option<u32> {
        self.duration_secs().map(|s| s * 1000)
    }

    /// Parse from string (case-insensitive, spaces and dashes ignored)
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "freeplay" | "free" => Some(Difficulty::FreePlay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::FreePlay => "Free Play",
        }
    }
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    /// The round clock ran out
    TimeUp,
    /// No adjacent swap would be legal
    NoMoves,
}

impl GameOverReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverReason::TimeUp => "time_up",
            GameOverReason::NoMoves => "no_moves",
        }
    }
}
