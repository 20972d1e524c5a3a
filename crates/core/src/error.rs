//! Error types for grid access and engine configuration.

/// Errors raised by [`crate::Grid`] operations.
///
/// Gameplay code only ever passes in-bounds coordinates, so these surface
/// from caller misuse (bad input mapping, malformed fixtures) and never from
/// match or refill logic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i8, col: i8 },

    #[error("fixture row {row}: {reason}")]
    Parse { row: usize, reason: String },
}

/// Errors raised when validating an [`crate::EngineConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("color count {0} is outside the supported range 3..=8")]
    ColorCount(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_display() {
        let err = GridError::OutOfBounds { row: 9, col: -1 };
        assert_eq!(err.to_string(), "cell (9, -1) is outside the grid");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ColorCount(12);
        assert_eq!(
            err.to_string(),
            "color count 12 is outside the supported range 3..=8"
        );
    }
}
