//! Branches and ensemble maintenance.
//!
//! A branch is one classical position paired with a complex amplitude. The
//! helpers here keep a branch list well formed: [`merge`] resolves
//! interference between branches that reached the same position, [`prune`]
//! enforces the branch cap, and [`normalize`] restores unit total mass.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use num_complex::Complex64;

use crate::error::QuantumError;
use crate::position::ClassicalPosition;

/// Complex probability amplitude. `norm_sqr()` is the probability mass.
pub type Amplitude = Complex64;

/// `1/√2`, the amplitude factor applied to each child of a split.
pub const INV_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Tolerance used when checking that total mass is one.
pub const MASS_TOLERANCE: f64 = 1e-9;

/// One term of the superposition.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch<P> {
    position: P,
    amplitude: Amplitude,
}

impl<P> Branch<P> {
    pub fn new(position: P, amplitude: Amplitude) -> Self {
        Self {
            position,
            amplitude,
        }
    }

    #[inline]
    pub fn position(&self) -> &P {
        &self.position
    }

    #[inline]
    pub fn amplitude(&self) -> Amplitude {
        self.amplitude
    }

    /// Squared modulus of the amplitude.
    #[inline]
    pub fn probability(&self) -> f64 {
        self.amplitude.norm_sqr()
    }

    pub fn into_parts(self) -> (P, Amplitude) {
        (self.position, self.amplitude)
    }

    pub(crate) fn with_position(&self, position: P) -> Self {
        Self {
            position,
            amplitude: self.amplitude,
        }
    }
}

/// Sum of squared moduli.
pub fn total_mass<P>(branches: &[Branch<P>]) -> f64 {
    branches.iter().map(Branch::probability).sum()
}

/// Rescale amplitudes so the total mass is one.
///
/// Fails with [`QuantumError::DegenerateState`] when there is no mass left to
/// rescale; the branches are not touched in that case.
pub fn normalize<P>(branches: &mut [Branch<P>]) -> Result<(), QuantumError> {
    let mass = total_mass(branches);
    if branches.is_empty() || !mass.is_finite() || mass < f64::MIN_POSITIVE {
        return Err(QuantumError::DegenerateState { mass });
    }
    let scale = mass.sqrt().recip();
    for branch in branches.iter_mut() {
        branch.amplitude *= scale;
    }
    Ok(())
}

/// Combine branches with identical canonical keys by summing amplitudes.
///
/// Groups keep the order in which their first member appeared and the first
/// member's position. Groups whose combined squared modulus is at or below
/// `epsilon` have cancelled out and are dropped. Does not renormalize.
pub fn merge<P: ClassicalPosition>(branches: Vec<Branch<P>>, epsilon: f64) -> Vec<Branch<P>> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(branches.len());
    let mut merged: Vec<Branch<P>> = Vec::with_capacity(branches.len());

    for branch in branches {
        match slots.entry(branch.position.canonical_key()) {
            Entry::Occupied(slot) => merged[*slot.get()].amplitude += branch.amplitude,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(branch);
            }
        }
    }

    merged.retain(|branch| branch.probability() > epsilon);
    merged
}

/// Keep the `max_branches` most probable branches.
///
/// Ties are broken by position in the list, earlier wins. Survivors keep
/// their relative order. Returns the number of branches dropped. Does not
/// renormalize.
pub fn prune<P>(branches: &mut Vec<Branch<P>>, max_branches: usize) -> usize {
    let len = branches.len();
    if len <= max_branches {
        return 0;
    }

    // Stable sort: equal masses stay in insertion order
    let mut ranked: Vec<usize> = (0..len).collect();
    ranked.sort_by(|&a, &b| {
        branches[b]
            .probability()
            .total_cmp(&branches[a].probability())
    });

    let mut keep = vec![false; len];
    for &index in &ranked[..max_branches] {
        keep[index] = true;
    }

    let mut index = 0;
    branches.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });

    len - max_branches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ToyPosition;

    fn amp(re: f64, im: f64) -> Amplitude {
        Amplitude::new(re, im)
    }

    #[test]
    fn normalize_rescales_to_unit_mass() {
        let mut branches = vec![
            Branch::new(ToyPosition::with_token("a"), amp(3.0, 0.0)),
            Branch::new(ToyPosition::with_token("b"), amp(0.0, 4.0)),
        ];
        normalize(&mut branches).unwrap();

        assert!((total_mass(&branches) - 1.0).abs() < MASS_TOLERANCE);
        assert!((branches[0].probability() - 0.36).abs() < 1e-12);
        assert!((branches[1].probability() - 0.64).abs() < 1e-12);
    }

    #[test]
    fn normalize_rejects_zero_mass() {
        let mut branches = vec![Branch::new(ToyPosition::with_token("a"), amp(0.0, 0.0))];
        let err = normalize(&mut branches).unwrap_err();
        assert!(matches!(err, QuantumError::DegenerateState { .. }));

        let mut empty: Vec<Branch<ToyPosition>> = Vec::new();
        assert!(normalize(&mut empty).is_err());
    }

    #[test]
    fn merge_sums_amplitudes_not_probabilities() {
        let a = amp(INV_SQRT_2, 0.0);
        let branches = vec![
            Branch::new(ToyPosition::with_token("same"), a),
            Branch::new(ToyPosition::with_token("same"), a),
        ];
        let merged = merge(branches, 1e-24);

        assert_eq!(merged.len(), 1);
        // |a + a|^2 = 2, not |a|^2 + |a|^2 = 1
        assert!((merged[0].probability() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn merge_is_phase_aware() {
        let branches = vec![
            Branch::new(ToyPosition::with_token("same"), amp(0.7071, 0.0)),
            Branch::new(ToyPosition::with_token("same"), amp(0.0, 0.7071)),
        ];
        let mut merged = merge(branches, 1e-24);
        assert_eq!(merged.len(), 1);
        assert!((merged[0].probability() - 0.7071f64.powi(2) * 2.0).abs() < 1e-12);

        normalize(&mut merged).unwrap();
        assert!((merged[0].probability() - 1.0).abs() < MASS_TOLERANCE);
    }

    #[test]
    fn merge_drops_cancelled_groups_and_keeps_order() {
        let branches = vec![
            Branch::new(ToyPosition::with_token("x"), amp(0.5, 0.0)),
            Branch::new(ToyPosition::with_token("y"), amp(0.5, 0.0)),
            Branch::new(ToyPosition::with_token("x"), amp(-0.5, 0.0)),
            Branch::new(ToyPosition::with_token("z"), amp(0.5, 0.0)),
        ];
        let merged = merge(branches, 1e-24);
        let tokens: Vec<_> = merged.iter().map(|b| b.position().token()).collect();
        assert_eq!(tokens, vec!["y", "z"]);
    }

    #[test]
    fn prune_keeps_most_probable_with_stable_ties() {
        let mut branches = vec![
            Branch::new(ToyPosition::with_token("low"), amp(0.1, 0.0)),
            Branch::new(ToyPosition::with_token("tie1"), amp(0.5, 0.0)),
            Branch::new(ToyPosition::with_token("high"), amp(0.0, 0.9)),
            Branch::new(ToyPosition::with_token("tie2"), amp(0.5, 0.0)),
        ];
        let dropped = prune(&mut branches, 2);
        assert_eq!(dropped, 2);

        let tokens: Vec<_> = branches.iter().map(|b| b.position().token()).collect();
        assert_eq!(tokens, vec!["tie1", "high"]);
    }

    #[test]
    fn prune_below_cap_is_noop() {
        let mut branches = vec![Branch::new(ToyPosition::with_token("a"), amp(1.0, 0.0))];
        assert_eq!(prune(&mut branches, 4), 0);
        assert_eq!(branches.len(), 1);
    }
}
