//! Two-outcome measurement.
//!
//! A measurement partitions the branch list with a boolean mask, samples one
//! side with probability proportional to its squared-modulus mass, and
//! discards the other side. The caller renormalizes.

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::branch::{total_mass, Branch};
use crate::error::QuantumError;

/// What question a measurement answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    /// Is the destination held by the mover's own piece?
    Exclusion,
    /// Does the move capture?
    Capture,
}

/// Which side of the mask survived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Branches where the mask was `true`.
    A,
    /// Branches where the mask was `false`.
    B,
}

/// Record of one measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub outcome: Outcome,
    /// Mass of the `true` side before collapse.
    pub p_a: f64,
    /// Mass of the `false` side before collapse.
    pub p_b: f64,
}

impl Measurement {
    /// Probability that outcome A would be observed.
    pub fn chance_a(&self) -> f64 {
        self.p_a / (self.p_a + self.p_b)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match (self.kind, self.outcome) {
            (MeasurementKind::Exclusion, Outcome::A) => "BLOCKED",
            (MeasurementKind::Exclusion, Outcome::B) => "CLEAR",
            (MeasurementKind::Capture, Outcome::A) => "CAPTURE-SUCCESS",
            (MeasurementKind::Capture, Outcome::B) => "CAPTURE-FAIL",
        };
        write!(f, "{label} p={:.2}", self.chance_a())
    }
}

/// Measure `mask` against its complement and collapse `branches` in place.
///
/// Draws exactly one `f64` from `rng`. Fails with
/// [`QuantumError::DegenerateState`] when the branches carry no mass.
pub fn measure<P>(
    branches: &mut Vec<Branch<P>>,
    mask: &[bool],
    kind: MeasurementKind,
    rng: &mut ChaCha20Rng,
) -> Result<Measurement, QuantumError> {
    debug_assert_eq!(branches.len(), mask.len());

    let p_a: f64 = branches
        .iter()
        .zip(mask)
        .filter(|(_, in_a)| **in_a)
        .map(|(branch, _)| branch.probability())
        .sum();
    let total = total_mass(branches);
    let p_b = (total - p_a).max(0.0);

    if total.is_nan() || total <= 0.0 {
        return Err(QuantumError::DegenerateState { mass: total });
    }

    let u: f64 = rng.gen::<f64>() * (p_a + p_b);
    let outcome = if u < p_a { Outcome::A } else { Outcome::B };
    let keep_a = outcome == Outcome::A;

    let mut index = 0;
    branches.retain(|_| {
        let kept = mask[index] == keep_a;
        index += 1;
        kept
    });

    Ok(Measurement {
        kind,
        outcome,
        p_a,
        p_b,
    })
}
