//! The quantum board: a superposition of classical positions.
//!
//! [`QuantumBoard`] owns an ordered list of branches and keeps four
//! properties true after every public call:
//!
//! 1. total squared-modulus mass is one (within [`MASS_TOLERANCE`]),
//! 2. no two branches share a canonical position key,
//! 3. the branch count never exceeds `max_branches`,
//! 4. every branch has the same side to move, flipping once per half-turn.
//!
//! Mutating calls build the next branch list in a fresh vector and commit it
//! only at the end, so a rejected move or split leaves nothing behind.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, error, trace, warn};

use crate::branch::{self, Amplitude, Branch, INV_SQRT_2, MASS_TOLERANCE};
use crate::config::QuantumConfig;
use crate::error::QuantumError;
use crate::events::QuantumEvent;
use crate::measurement::{self, MeasurementKind};
use crate::position::{ClassicalPosition, Coord, GameResult, Occupant, PieceKind, Side, Square};

/// Upper bound on measure-and-retry rounds inside one `apply_move`.
///
/// Each round either commits, fails, or measures; a measurement leaves the
/// ensemble homogeneous in the property it measured, so three rounds suffice
/// for a well-behaved rules engine.
pub const MAX_RESOLUTION_ROUNDS: usize = 8;

/// What happened during a committed move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// Branches where the move was played.
    pub moved: usize,
    /// Branches that passed the half-turn because the move was illegal there.
    pub passed: usize,
    /// Branches discarded because they could neither move nor pass.
    pub dropped: usize,
    /// Measurements performed before the move could be resolved.
    pub measurements: usize,
}

/// What happened during a committed split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitReport {
    /// Branches that divided into two children.
    pub split: usize,
    /// Branches that passed the half-turn instead.
    pub passed: usize,
    /// Branches discarded because they could neither split nor pass.
    pub dropped: usize,
}

/// How one branch sees a requested move.
#[derive(Debug)]
enum Resolution<M> {
    /// Destination holds the mover's own piece.
    Blocked,
    Legal { mv: M, capture: bool },
    /// Illegal for any other reason.
    Illegal,
}

impl<M> Resolution<M> {
    fn is_legal(&self) -> bool {
        matches!(self, Self::Legal { .. })
    }
}

fn classify<P: ClassicalPosition>(
    position: &P,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
) -> Resolution<P::Move> {
    let side = position.side_to_move();
    if position
        .piece_at(to)
        .is_some_and(|occupant| occupant.side == side)
    {
        return Resolution::Blocked;
    }
    match position.find_legal_move(from, to, promotion) {
        Some(mv) => {
            let capture = position.is_capture(&mv);
            Resolution::Legal { mv, capture }
        }
        None => Resolution::Illegal,
    }
}

/// Both halves of a split, or `None` if this branch cannot split.
fn split_moves<P: ClassicalPosition>(
    position: &P,
    from: Square,
    to_a: Square,
    to_b: Square,
    promotion: Option<PieceKind>,
) -> Option<(P::Move, P::Move)> {
    let side = position.side_to_move();
    let own = |square: Square| {
        position
            .piece_at(square)
            .is_some_and(|occupant| occupant.side == side)
    };
    if own(to_a) || own(to_b) {
        return None;
    }

    let mv_a = position.find_legal_move(from, to_a, promotion)?;
    let mv_b = position.find_legal_move(from, to_b, promotion)?;
    if position.is_capture(&mv_a) || position.is_capture(&mv_b) {
        return None;
    }
    Some((mv_a, mv_b))
}

/// Weighted superposition of classical positions.
#[derive(Debug, Clone)]
pub struct QuantumBoard<P: ClassicalPosition> {
    pub(crate) branches: Vec<Branch<P>>,
    pub(crate) config: QuantumConfig,
    pub(crate) rng: ChaCha20Rng,
    /// Side to move shared by every branch.
    pub(crate) side_to_move: Side,
    pub(crate) half_turns: u32,
    /// Random draws consumed so far.
    pub(crate) measurements: u64,
    pub(crate) history: Vec<QuantumEvent>,
}

impl<P: ClassicalPosition> QuantumBoard<P> {
    /// Board with a single certain branch at the starting position.
    pub fn new(config: QuantumConfig) -> Self {
        Self::from_position(P::initial(), config)
    }

    /// Board with a single certain branch at `position`.
    pub fn from_position(position: P, config: QuantumConfig) -> Self {
        let config = sanitize(config);
        Self {
            side_to_move: position.side_to_move(),
            branches: vec![Branch::new(position, Amplitude::new(1.0, 0.0))],
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            config,
            half_turns: 0,
            measurements: 0,
            history: Vec::new(),
        }
    }

    /// Board from explicit branches.
    ///
    /// Branches are merged, pruned and normalized. Every position must have
    /// the same side to move.
    pub fn from_branches(
        branches: Vec<(P, Amplitude)>,
        config: QuantumConfig,
    ) -> Result<Self, QuantumError> {
        let config = sanitize(config);
        let side_to_move = branches
            .first()
            .map(|(position, _)| position.side_to_move())
            .ok_or(QuantumError::DegenerateState { mass: 0.0 })?;
        if branches
            .iter()
            .any(|(position, _)| position.side_to_move() != side_to_move)
        {
            return Err(QuantumError::InvariantViolation(
                "branches disagree on side to move".to_string(),
            ));
        }

        let branches = branches
            .into_iter()
            .map(|(position, amplitude)| Branch::new(position, amplitude))
            .collect();
        let mut branches = branch::merge(branches, config.epsilon);
        branch::prune(&mut branches, config.max_branches);
        branch::normalize(&mut branches)?;

        Ok(Self {
            branches,
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            config,
            side_to_move,
            half_turns: 0,
            measurements: 0,
            history: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Play `from -> to` across the superposition. Returns `false` if the
    /// move is not legal in any branch or the board had to be reset.
    pub fn apply_move(&mut self, from: Coord, to: Coord, promotion: Option<PieceKind>) -> bool {
        match self.try_apply_move(from, to, promotion) {
            Ok(_) => true,
            Err(err) => {
                if err.is_internal() {
                    error!("Move {} -> {} failed: {}", from, to, err);
                } else {
                    debug!("Move {} -> {} rejected: {}", from, to, err);
                }
                false
            }
        }
    }

    /// Play `from -> to`, measuring first wherever branches disagree.
    ///
    /// Branches are classified as blocked by an own piece, legal (capture or
    /// not), or otherwise illegal. A blocked/unblocked mix is measured first,
    /// then a capture/non-capture mix; each measurement restarts the
    /// classification on the surviving branches. Once the ensemble agrees,
    /// legal branches play the move and the rest pass the half-turn.
    ///
    /// A measurement is an observation and is never rolled back. If it
    /// collapses onto the branches where the destination holds an own piece,
    /// every branch passes the half-turn and the call still succeeds with
    /// `moved == 0`.
    pub fn try_apply_move(
        &mut self,
        from: Coord,
        to: Coord,
        promotion: Option<PieceKind>,
    ) -> Result<MoveReport, QuantumError> {
        let illegal = QuantumError::IllegalMove { from, to };
        let (Some(from_sq), Some(to_sq)) = (from.to_square(), to.to_square()) else {
            return Err(illegal);
        };

        let mut report = MoveReport::default();
        for round in 0..MAX_RESOLUTION_ROUNDS {
            let plan: Vec<Resolution<P::Move>> = self
                .branches
                .iter()
                .map(|branch| classify(branch.position(), from_sq, to_sq, promotion))
                .collect();
            trace!("Round {}: classified {} branches", round, plan.len());

            if !plan.iter().any(Resolution::is_legal) {
                // The board was already observed this call; the half-turn is spent
                if report.measurements > 0 {
                    return self.commit_move(plan, from_sq, to_sq, promotion, report);
                }
                return Err(illegal);
            }

            let blocked: Vec<bool> = plan
                .iter()
                .map(|resolution| matches!(resolution, Resolution::Blocked))
                .collect();
            if blocked.contains(&true) {
                self.observe(&blocked, MeasurementKind::Exclusion)?;
                report.measurements += 1;
                continue;
            }

            let captures: Vec<bool> = plan
                .iter()
                .map(|resolution| matches!(resolution, Resolution::Legal { capture: true, .. }))
                .collect();
            let quiet = plan
                .iter()
                .any(|resolution| matches!(resolution, Resolution::Legal { capture: false, .. }));
            if quiet && captures.contains(&true) {
                self.observe(&captures, MeasurementKind::Capture)?;
                report.measurements += 1;
                continue;
            }

            return self.commit_move(plan, from_sq, to_sq, promotion, report);
        }

        let mass = branch::total_mass(&self.branches);
        Err(self.reset(QuantumError::DegenerateState { mass }))
    }

    fn commit_move(
        &mut self,
        plan: Vec<Resolution<P::Move>>,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        mut report: MoveReport,
    ) -> Result<MoveReport, QuantumError> {
        let mut next = Vec::with_capacity(self.branches.len());
        for (branch, resolution) in self.branches.iter().zip(plan) {
            match resolution {
                Resolution::Legal { mv, .. } => {
                    next.push(branch.with_position(branch.position().apply(&mv)));
                    report.moved += 1;
                }
                Resolution::Blocked | Resolution::Illegal => match branch.position().pass() {
                    Some(position) => {
                        next.push(branch.with_position(position));
                        report.passed += 1;
                    }
                    None => {
                        warn!(
                            "Dropping branch that cannot pass the half-turn: {}",
                            branch.position().canonical_key()
                        );
                        report.dropped += 1;
                    }
                },
            }
        }

        debug!(
            "Move {}->{} committed: {} moved, {} passed, {} dropped",
            from, to, report.moved, report.passed, report.dropped
        );
        self.advance_turn();
        self.history.push(QuantumEvent::Move {
            from,
            to,
            promotion,
        });
        self.settle(next)?;
        Ok(report)
    }

    /// Split the piece on `from` between `to_a` and `to_b` with the default
    /// phase `i` on the second child.
    pub fn apply_split(&mut self, from: Coord, to_a: Coord, to_b: Coord) -> bool {
        self.apply_split_with_phase(from, to_a, to_b, Amplitude::i(), None)
    }

    /// Split with an explicit phase on the second child and an optional
    /// promotion piece for pawns reaching the last rank.
    pub fn apply_split_with_phase(
        &mut self,
        from: Coord,
        to_a: Coord,
        to_b: Coord,
        phase_b: Amplitude,
        promotion: Option<PieceKind>,
    ) -> bool {
        match self.try_apply_split(from, to_a, to_b, phase_b, promotion) {
            Ok(_) => true,
            Err(err) => {
                if err.is_internal() {
                    error!("Split {} -> {} | {} failed: {}", from, to_a, to_b, err);
                } else {
                    debug!("Split {} -> {} | {} rejected: {}", from, to_a, to_b, err);
                }
                false
            }
        }
    }

    /// Divide every branch that can make both quiet moves into two children
    /// with amplitudes `a/√2` and `a·phase_b/√2`. Branches that cannot split
    /// pass the half-turn. Fails without touching the board if no branch
    /// splits.
    pub fn try_apply_split(
        &mut self,
        from: Coord,
        to_a: Coord,
        to_b: Coord,
        phase_b: Amplitude,
        promotion: Option<PieceKind>,
    ) -> Result<SplitReport, QuantumError> {
        let modulus = phase_b.norm();
        if (modulus - 1.0).abs() > MASS_TOLERANCE {
            return Err(QuantumError::NonUnitPhase(modulus));
        }

        let invalid = QuantumError::InvalidSplit { from, to_a, to_b };
        let (Some(from_sq), Some(a_sq), Some(b_sq)) =
            (from.to_square(), to_a.to_square(), to_b.to_square())
        else {
            return Err(invalid);
        };
        if a_sq == b_sq {
            return Err(invalid);
        }

        let weight_b = phase_b * INV_SQRT_2;
        let mut report = SplitReport::default();
        let mut next = Vec::with_capacity(self.branches.len() * 2);
        for branch in &self.branches {
            let position = branch.position();
            match split_moves(position, from_sq, a_sq, b_sq, promotion) {
                Some((mv_a, mv_b)) => {
                    next.push(Branch::new(
                        position.apply(&mv_a),
                        branch.amplitude() * INV_SQRT_2,
                    ));
                    next.push(Branch::new(
                        position.apply(&mv_b),
                        branch.amplitude() * weight_b,
                    ));
                    report.split += 1;
                }
                None => match position.pass() {
                    Some(passed) => {
                        next.push(branch.with_position(passed));
                        report.passed += 1;
                    }
                    None => report.dropped += 1,
                },
            }
        }

        if report.split == 0 {
            return Err(invalid);
        }

        debug!(
            "Split {}->{}|{} committed: {} split, {} passed, {} dropped",
            from_sq, a_sq, b_sq, report.split, report.passed, report.dropped
        );
        self.advance_turn();
        self.history.push(QuantumEvent::Split {
            from: from_sq,
            to_a: a_sq,
            to_b: b_sq,
            split: report.split,
        });
        self.settle(next)?;
        Ok(report)
    }

    fn advance_turn(&mut self) {
        self.half_turns += 1;
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Measure `mask` against its complement, collapse and renormalize.
    fn observe(&mut self, mask: &[bool], kind: MeasurementKind) -> Result<(), QuantumError> {
        let measurement = match measurement::measure(&mut self.branches, mask, kind, &mut self.rng)
        {
            Ok(measurement) => measurement,
            Err(err) => return Err(self.reset(err)),
        };
        self.measurements += 1;
        debug!(
            "Measured {:?}: {:?} (p_a={:.4}, p_b={:.4}), {} branches remain",
            kind,
            measurement.outcome,
            measurement.p_a,
            measurement.p_b,
            self.branches.len()
        );
        self.history.push(QuantumEvent::Measurement(measurement));

        if let Err(err) = branch::normalize(&mut self.branches) {
            return Err(self.reset(err));
        }
        Ok(())
    }

    /// Merge, prune, normalize and commit `next`.
    fn settle(&mut self, next: Vec<Branch<P>>) -> Result<(), QuantumError> {
        let mut next = branch::merge(next, self.config.epsilon);
        let dropped = branch::prune(&mut next, self.config.max_branches);
        if dropped > 0 {
            debug!("Pruned {} low-probability branches", dropped);
            self.history.push(QuantumEvent::Pruned { dropped });
        }

        if let Err(err) = branch::normalize(&mut next) {
            return Err(self.reset(err));
        }
        self.branches = next;
        debug_assert!(self.check_invariants().is_ok());
        Ok(())
    }

    /// Recover from a degenerate distribution: back to one certain branch at
    /// the starting position. Returns `err` for the caller to propagate.
    fn reset(&mut self, err: QuantumError) -> QuantumError {
        error!("{}; resetting to initial position", err);
        let position = P::initial();
        self.side_to_move = position.side_to_move();
        self.branches = vec![Branch::new(position, Amplitude::new(1.0, 0.0))];
        self.half_turns = 0;
        self.history.push(QuantumEvent::Reset);
        err
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Position of the most probable branch; the first one wins ties.
    pub fn most_likely_position(&self) -> &P {
        let mut best = &self.branches[0];
        for branch in &self.branches[1..] {
            if branch.probability() > best.probability() {
                best = branch;
            }
        }
        best.position()
    }

    /// Side to move according to the dominant branch.
    pub fn side_to_move(&self) -> Side {
        self.most_likely_position().side_to_move()
    }

    pub fn is_game_over(&self) -> bool {
        self.result().is_over()
    }

    /// Game result according to the dominant branch.
    pub fn result(&self) -> GameResult {
        self.most_likely_position().outcome()
    }

    /// Probability of each occupant (or `None` for empty) on `coord`.
    /// Values sum to one.
    pub fn square_distribution(
        &self,
        coord: Coord,
    ) -> Result<BTreeMap<Option<Occupant>, f64>, QuantumError> {
        let square = coord
            .to_square()
            .ok_or(QuantumError::InvalidCoordinate(coord))?;
        let mut distribution = BTreeMap::new();
        for branch in &self.branches {
            *distribution
                .entry(branch.position().piece_at(square))
                .or_insert(0.0) += branch.probability();
        }
        Ok(distribution)
    }

    /// Probability that `coord` is occupied at all.
    pub fn piece_probability(&self, coord: Coord) -> Result<f64, QuantumError> {
        let distribution = self.square_distribution(coord)?;
        Ok(1.0 - distribution.get(&None).copied().unwrap_or(0.0))
    }

    /// Most probable occupant of `coord` and its probability, ignoring the
    /// empty outcome. `None` if the square is empty in every branch.
    pub fn most_likely_occupant(
        &self,
        coord: Coord,
    ) -> Result<Option<(Occupant, f64)>, QuantumError> {
        let distribution = self.square_distribution(coord)?;
        let mut best: Option<(Occupant, f64)> = None;
        for (occupant, probability) in distribution {
            let Some(occupant) = occupant else {
                continue;
            };
            if best.map_or(true, |(_, p)| probability > p) {
                best = Some((occupant, probability));
            }
        }
        Ok(best)
    }

    /// Destinations reachable from `origin` in any branch where `origin`
    /// holds a piece of that branch's side to move. Sorted; empty for
    /// off-board input.
    pub fn legal_moves_union(&self, origin: Coord) -> Vec<Coord> {
        let Some(square) = origin.to_square() else {
            return Vec::new();
        };

        let mut destinations = BTreeSet::new();
        for branch in &self.branches {
            let position = branch.position();
            let side = position.side_to_move();
            if !position
                .piece_at(square)
                .is_some_and(|occupant| occupant.side == side)
            {
                continue;
            }
            destinations.extend(
                position
                    .legal_moves()
                    .into_iter()
                    .filter(|mv| mv.from == square)
                    .map(|mv| mv.to.to_coord()),
            );
        }
        destinations.into_iter().collect()
    }

    /// Every move legal in some branch (UCI) with the total probability of
    /// the branches where it is legal.
    pub fn legal_move_distribution(&self) -> BTreeMap<String, f64> {
        let mut distribution = BTreeMap::new();
        for branch in &self.branches {
            let probability = branch.probability();
            for mv in branch.position().legal_moves() {
                *distribution.entry(mv.to_string()).or_insert(0.0) += probability;
            }
        }
        distribution
    }

    pub fn branches(&self) -> &[Branch<P>] {
        &self.branches
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn config(&self) -> &QuantumConfig {
        &self.config
    }

    pub fn half_turns(&self) -> u32 {
        self.half_turns
    }

    pub fn measurements(&self) -> u64 {
        self.measurements
    }

    pub fn history(&self) -> &[QuantumEvent] {
        &self.history
    }

    /// Verify the ensemble invariants.
    pub fn check_invariants(&self) -> Result<(), QuantumError> {
        let violation = |message: String| Err(QuantumError::InvariantViolation(message));

        let mass = branch::total_mass(&self.branches);
        if (mass - 1.0).abs() > MASS_TOLERANCE {
            return violation(format!("total probability mass is {mass}"));
        }
        if self.branches.len() > self.config.max_branches {
            return violation(format!(
                "{} branches exceed the cap of {}",
                self.branches.len(),
                self.config.max_branches
            ));
        }

        let mut keys = HashSet::with_capacity(self.branches.len());
        for branch in &self.branches {
            let key = branch.position().canonical_key();
            if branch.probability() <= 0.0 {
                return violation(format!("zero amplitude at {key}"));
            }
            if branch.position().side_to_move() != self.side_to_move {
                return violation(format!(
                    "side to move at {key} disagrees after {} half-turns",
                    self.half_turns
                ));
            }
            if !keys.insert(key) {
                return violation("duplicate canonical position key".to_string());
            }
        }
        Ok(())
    }
}

/// A cap of zero would discard every branch.
fn sanitize(mut config: QuantumConfig) -> QuantumConfig {
    config.max_branches = config.max_branches.max(1);
    config
}
