//! Branching superposition engine for quantum-lite chess
//!
//! This crate models a chess game as a weighted set of classical positions,
//! each carrying a complex amplitude:
//! - `ClassicalPosition`: trait a rules engine implements for one concrete position
//! - `Branch`: one position plus its amplitude
//! - `QuantumBoard`: the ensemble, with move, split, measurement and query operations
//! - `Snapshot`: serde persistence of a board
//!
//! Chess rules themselves live behind `ClassicalPosition`; see the
//! `qlc-chess` crate for the standard implementation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use qlc_core::{Coord, QuantumBoard, QuantumConfig};
//! use qlc_chess::StandardPosition;
//!
//! let mut board = QuantumBoard::<StandardPosition>::new(QuantumConfig::default());
//!
//! // Knight b1 to both a3 and c3 at once
//! assert!(board.apply_split(Coord::new(7, 1), Coord::new(5, 0), Coord::new(5, 2)));
//! assert_eq!(board.branch_count(), 2);
//! ```

pub mod board;
pub mod branch;
pub mod config;
pub mod error;
pub mod events;
pub mod measurement;
pub mod position;
pub mod snapshot;

// Re-export main types for convenience
pub use board::{MoveReport, QuantumBoard, SplitReport, MAX_RESOLUTION_ROUNDS};
pub use branch::{Amplitude, Branch, INV_SQRT_2, MASS_TOLERANCE};
pub use config::QuantumConfig;
pub use error::QuantumError;
pub use events::QuantumEvent;
pub use measurement::{Measurement, MeasurementKind, Outcome};
pub use position::{
    ClassicalPosition, Coord, GameResult, MoveSpec, Occupant, PieceKind, PositionError, Side,
    Square,
};
pub use snapshot::{BranchRecord, Snapshot};

#[cfg(test)]
pub(crate) mod test_support;
