//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Difficulty, DEFAULT_COLOR_COUNT, MAX_COLOR_COUNT, MIN_COLOR_COUNT};

/// Parameters fixed for the lifetime of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seeds both the refill draw and effect randomness
    pub seed: u32,
    pub difficulty: Difficulty,
    /// Number of plain colors, `MIN_COLOR_COUNT..=MAX_COLOR_COUNT`
    pub color_count: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            difficulty: Difficulty::default(),
            color_count: DEFAULT_COLOR_COUNT,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_color_count(mut self, color_count: u8) -> Self {
        self.color_count = color_count;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_COLOR_COUNT..=MAX_COLOR_COUNT).contains(&self.color_count) {
            return Err(ConfigError::ColorCount(self.color_count));
        }
        Ok(())
    }
}
