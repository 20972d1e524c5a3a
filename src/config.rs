//! Runner configuration read from the environment
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `BUBBLE_POP_SEED` | engine seed | `1` |
//! | `BUBBLE_POP_DIFFICULTY` | `easy`, `normal`, `hard` or `free` | `normal` |
//! | `BUBBLE_POP_COLORS` | plain colors, 3..=8 | `6` |
//! | `BUBBLE_POP_MAX_MOVES` | swap cap for the autoplay round | `500` |
//! | `BUBBLE_POP_JSON` | `1` or `true` for a JSON report | off |
//!
//! Unparseable numbers fall back to their default; an unknown difficulty name
//! or an out-of-range color count is an error.

use std::env;

use bubble_pop_core::{ConfigError, EngineConfig};
use bubble_pop_types::Difficulty;

pub const DEFAULT_MAX_MOVES: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimConfigError {
    #[error("unknown difficulty {0:?} (expected easy, normal, hard or free)")]
    Difficulty(String),

    #[error(transparent)]
    Engine(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub engine: EngineConfig,
    pub max_moves: u32,
    pub json: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            max_moves: DEFAULT_MAX_MOVES,
            json: false,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Result<Self, SimConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (the environment, or a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SimConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed = lookup("BUBBLE_POP_SEED")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.engine.seed);

        let difficulty = match lookup("BUBBLE_POP_DIFFICULTY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        {
            Some(name) => {
                Difficulty::from_str(&name).ok_or(SimConfigError::Difficulty(name))?
            }
            None => defaults.engine.difficulty,
        };

        let color_count = lookup("BUBBLE_POP_COLORS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.engine.color_count);

        let max_moves = lookup("BUBBLE_POP_MAX_MOVES")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_moves);

        let json = lookup("BUBBLE_POP_JSON")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let engine = EngineConfig {
            seed,
            difficulty,
            color_count,
        };
        engine.validate()?;

        Ok(Self {
            engine,
            max_moves,
            json,
        })
    }
}
