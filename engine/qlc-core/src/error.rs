//! Error types for quantum board operations.

use thiserror::Error;

use crate::position::{Coord, PositionError};

/// Errors that can occur while operating on a [`QuantumBoard`](crate::QuantumBoard).
///
/// `IllegalMove` and `InvalidSplit` are ordinary caller-facing rejections and
/// leave the board as it was. `DegenerateState` signals a broken probability
/// distribution; the board has already been reset when it is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantumError {
    #[error("Illegal move {from} -> {to}: not legal in any branch")]
    IllegalMove { from: Coord, to: Coord },

    #[error("Invalid split {from} -> {to_a} | {to_b}: no branch can split")]
    InvalidSplit { from: Coord, to_a: Coord, to_b: Coord },

    #[error("Degenerate state: total probability mass {mass:e}, board reset to initial position")]
    DegenerateState { mass: f64 },

    #[error("Phase factor must have unit modulus, got {0}")]
    NonUnitPhase(f64),

    #[error("Coordinate {0} is off the board")]
    InvalidCoordinate(Coord),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl QuantumError {
    /// True for the internal-consistency class, as opposed to caller mistakes.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DegenerateState { .. } | Self::InvariantViolation(_)
        )
    }
}
