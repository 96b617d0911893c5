// Error types for the simulation engine.
//
// `SimError` covers every precondition violation an entry point can report.
// Failing to find a path and a unit running out of resource are *not* errors:
// the first yields an empty path, the second is a normal removal.
//
// `ConfigError` is kept separate so drivers can tell a bad config file apart
// from a bad request to the engine.

use crate::types::{CompanyId, Position, UnitRef};
use thiserror::Error;

/// Errors reported by grid, registry, and simulation entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// A cell was handed something that is not a live unit standing on it.
    #[error("{unit} cannot occupy cell {pos}: not a registered unit at that position")]
    InvalidUnitAssignment { pos: Position, unit: UnitRef },

    /// The factory was given a kind code outside 0..=2.
    #[error("unknown unit kind code {0}")]
    UnknownUnitKind(u8),

    /// A position outside the grid was used.
    #[error("position {pos} is outside the {rows}x{cols} grid")]
    OutOfBounds { pos: Position, rows: u32, cols: u32 },

    /// A unit was requested on a cell that already holds one.
    #[error("cell {pos} is already occupied")]
    CellOccupied { pos: Position },

    /// Products only exist on behalf of a company.
    #[error("a product cannot be created without an owning company")]
    ProductWithoutCompany,

    /// The company handle does not resolve to a live company.
    #[error("{0} is not a registered company")]
    UnknownCompany(CompanyId),
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while loading a `SimConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_position() {
        let err = SimError::OutOfBounds {
            pos: Position::new(7, 2),
            rows: 5,
            cols: 5,
        };
        assert_eq!(err.to_string(), "position (7, 2) is outside the 5x5 grid");

        let err = SimError::CellOccupied {
            pos: Position::new(1, 1),
        };
        assert_eq!(err.to_string(), "cell (1, 1) is already occupied");
    }

    #[test]
    fn parse_failures_convert_into_config_error() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
