//! Persistence format for a quantum board.
//!
//! A snapshot is the branch list as `(canonical key, re, im)` records plus
//! the configuration. The random stream is not stored; it is rebuilt from the
//! seed and fast-forwarded past the draws already consumed, so a restored
//! board measures exactly as the board it was taken from.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::board::QuantumBoard;
use crate::branch::Amplitude;
use crate::config::QuantumConfig;
use crate::error::QuantumError;
use crate::position::ClassicalPosition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub key: String,
    pub re: f64,
    pub im: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: QuantumConfig,
    pub half_turns: u32,
    /// Random draws consumed before the snapshot was taken.
    pub measurements: u64,
    pub branches: Vec<BranchRecord>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, QuantumError> {
        serde_json::to_string(self).map_err(|e| QuantumError::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, QuantumError> {
        serde_json::from_str(json).map_err(|e| QuantumError::Snapshot(e.to_string()))
    }
}

impl<P: ClassicalPosition> QuantumBoard<P> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            config: self.config.clone(),
            half_turns: self.half_turns,
            measurements: self.measurements,
            branches: self
                .branches
                .iter()
                .map(|branch| BranchRecord {
                    key: branch.position().canonical_key(),
                    re: branch.amplitude().re,
                    im: branch.amplitude().im,
                })
                .collect(),
        }
    }

    /// Rebuild a board from a snapshot. History is not part of the format
    /// and starts empty.
    pub fn restore(snapshot: &Snapshot) -> Result<Self, QuantumError> {
        let branches = snapshot
            .branches
            .iter()
            .map(|record| -> Result<(P, Amplitude), QuantumError> {
                let position = P::from_canonical_key(&record.key)?;
                Ok((position, Amplitude::new(record.re, record.im)))
            })
            .collect::<Result<Vec<_>, QuantumError>>()?;

        let mut board = Self::from_branches(branches, snapshot.config.clone())?;
        board.half_turns = snapshot.half_turns;

        let mut rng = ChaCha20Rng::seed_from_u64(board.config.seed);
        for _ in 0..snapshot.measurements {
            let _: f64 = rng.gen();
        }
        board.rng = rng;
        board.measurements = snapshot.measurements;

        board.check_invariants()?;
        Ok(board)
    }
}
