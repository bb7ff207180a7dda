//! Human-readable log of what happened to a board.

use std::fmt;

use crate::measurement::Measurement;
use crate::position::{PieceKind, Square};

#[derive(Debug, Clone, PartialEq)]
pub enum QuantumEvent {
    /// A move committed across the ensemble.
    Move {
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    },
    /// A split committed; `split` branches divided in two.
    Split {
        from: Square,
        to_a: Square,
        to_b: Square,
        split: usize,
    },
    Measurement(Measurement),
    /// Low-probability branches discarded to respect the cap.
    Pruned { dropped: usize },
    /// The distribution degenerated and the board was reset.
    Reset,
}

impl fmt::Display for QuantumEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move {
                from,
                to,
                promotion,
            } => {
                write!(f, "{from}->{to}")?;
                if let Some(kind) = promotion {
                    write!(f, "={}", kind.fen_code().to_ascii_uppercase())?;
                }
                Ok(())
            }
            Self::Split {
                from, to_a, to_b, ..
            } => write!(f, "SPLIT {from}->{to_a} | {to_b}"),
            Self::Measurement(measurement) => write!(f, "{measurement}"),
            Self::Pruned { dropped } => write!(f, "PRUNED {dropped}"),
            Self::Reset => f.write_str("RESET"),
        }
    }
}
