//! Core engine module - pure, deterministic, and testable
//!
//! This crate contains every rule of the match-3 game: the grid, match
//! detection, swap legality, special-token effects, scoring and the cascade
//! state machine. It does no rendering, audio or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical rounds
//! - **Testable**: Token sources are injectable, grids load from text fixtures
//! - **Portable**: Runs under any front end, or headless
//!
//! # Module Structure
//!
//! - [`grid`]: 9x9 token store with swap, removal and gravity refill
//! - [`catalog`]: token classification, score-gated refill draws, drop-in schedule
//! - [`matcher`]: wildcard-extended and exact match scans
//! - [`swap`]: swap legality, effect classification and move search
//! - [`effects`]: bomb, color-clear and snake cell sets
//! - [`scoring`]: points per group and round-clock bonus
//! - [`cascade`]: the engine state machine and its events
//! - [`selection`]: click-to-select input protocol
//! - [`snapshot`]: copies of engine state for presentation
//! - [`rng`]: small seeded generator behind every random decision
//!
//! # Game Rules
//!
//! - **Runs**: three or more of one color in a row or column are cleared;
//!   wildcards stand in for any color but never start a move
//! - **Color-clear**: swapped onto a color, removes every cell of that color
//! - **Bombs**: clear a row, a column, or both
//! - **Snake**: eats a random ten-cell path, one cell per step
//! - **Unlocks**: specials join the refill pool at 1000 / 6000 / 8000 points;
//!   power tokens start dropping in at 1500
//! - **Round end**: the clock runs out, or no legal swap remains
//!
//! # Example
//!
//! ```
//! use bubble_pop_core::{CascadeEngine, EngineConfig, EngineEvent};
//! use bubble_pop_core::types::TICK_MS;
//!
//! let mut engine = CascadeEngine::new(EngineConfig::default().with_seed(12345)).unwrap();
//!
//! // A fresh round always has a legal move
//! let (a, b) = engine.hint().unwrap();
//! assert!(engine.request_swap(a, b).is_accepted());
//! assert!(engine.score() > 0); // scored on acceptance
//!
//! // Removal, refill and cascades happen on the next tick
//! engine.tick(TICK_MS);
//! assert!(engine.is_idle() || engine.game_over());
//!
//! let steps = engine
//!     .drain_events()
//!     .iter()
//!     .filter(|e| matches!(e, EngineEvent::Step(_)))
//!     .count();
//! assert!(steps >= 1);
//! ```

pub mod cascade;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod error;
pub mod grid;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod selection;
pub mod snapshot;
pub mod swap;

pub use bubble_pop_types as types;

// Re-export commonly used types for convenience
pub use cascade::{
    CascadeEngine, EffectDescription, EffectKind, EngineEvent, EngineState, RoundReport,
    StepEvent, SwapOutcome,
};
pub use catalog::{CatalogDraw, DropInSchedule, TokenClass, TokenSource, UnlockTier};
pub use config::EngineConfig;
pub use effects::{EffectResult, SnakePath};
pub use error::{ConfigError, GridError};
pub use grid::Grid;
pub use matcher::{find_exact_matches, find_matches, has_any_match, MatchGroup};
pub use rng::SimpleRng;
pub use scoring::{score_for_chain, score_groups, StepScore};
pub use selection::Selection;
pub use snapshot::{GameSnapshot, GridSnapshot};
pub use swap::{classify_swap, find_move, has_moves, RejectReason, SwapClass};
