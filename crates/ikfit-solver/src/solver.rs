//! The inverse-kinematics solver: weighted damped Gauss-Newton over the goal
//! table, with a from-scratch mode (`assemble`) and a warm-started mode
//! (`track`) sharing all residual and weight machinery.

use ikfit_math::{DMat, DVec};
use tracing::{debug, warn};

use crate::error::{IkError, Result};
use crate::goal::{GoalTable, GoalTarget};
use crate::reference::{CoordinateReference, MarkersReference};
use crate::{KinematicModel, State};

/// Default stopping tolerance on the step infinity-norm.
pub const DEFAULT_ACCURACY: f64 = 1e-5;

const ASSEMBLE_MAX_ITERS: usize = 100;
const TRACK_MAX_ITERS: usize = 10;

/// Initial damping for a cold solve. Small, so the first steps run at nearly
/// the full Gauss-Newton trust region.
const ASSEMBLE_DAMPING: f64 = 1e-6;
/// Damping never drops below this; it keeps the normal matrix positive
/// definite, which makes under-determined solves deterministic (Tikhonov
/// step) instead of arbitrary.
const DAMPING_MIN: f64 = 1e-12;
const DAMPING_UP: f64 = 10.0;
const DAMPING_DOWN: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolveMode {
    Assemble,
    Track,
}

/// Solver bound to one model and one pair of reference providers.
///
/// The goal table is built once at construction; per frame only targets and
/// weights change. One calling thread per instance; distinct instances are
/// independent.
pub struct InverseKinematicsSolver<M: KinematicModel> {
    model: M,
    markers: MarkersReference,
    coord_refs: Vec<CoordinateReference>,
    table: GoalTable,
    accuracy: f64,
    /// Final damping of the previous solve; `track` warm-starts from it.
    damping: f64,
    /// Coordinates of the most recent solve; error queries evaluate here.
    q_current: DVec,
}

impl<M: KinematicModel> InverseKinematicsSolver<M> {
    /// Bind the solver to a model and its references, building the goal table
    /// immediately.
    pub fn new(
        model: M,
        markers: MarkersReference,
        coord_refs: Vec<CoordinateReference>,
    ) -> Result<Self> {
        let table = GoalTable::build(&model, &markers, &coord_refs)?;
        let n = model.ncoords();
        Ok(Self {
            model,
            markers,
            coord_refs,
            table,
            accuracy: DEFAULT_ACCURACY,
            damping: ASSEMBLE_DAMPING,
            q_current: DVec::zeros(n),
        })
    }

    /// Set the stopping tolerance. Must be positive.
    pub fn set_accuracy(&mut self, tolerance: f64) -> Result<()> {
        if !(tolerance > 0.0) {
            return Err(IkError::Configuration(format!(
                "accuracy must be positive, got {tolerance}"
            )));
        }
        self.accuracy = tolerance;
        Ok(())
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// The goal table (read-only); weights change through
    /// [`Self::update_marker_weights`].
    pub fn goals(&self) -> &GoalTable {
        &self.table
    }

    /// Marker goal names. Position `k` here corresponds to position `k` in
    /// any weight vector passed to [`Self::update_marker_weights`], for the
    /// lifetime of the solver.
    pub fn marker_names(&self) -> &[String] {
        self.table.marker_names()
    }

    /// Replace the marker weights in place. No solver caches are rebuilt;
    /// the next `assemble`/`track` sees the new weights and nothing else
    /// changes.
    pub fn update_marker_weights(&mut self, weights: &[f64]) -> Result<()> {
        self.table.set_marker_weights(weights)
    }

    /// Solve from scratch: the model's current coordinates are the initial
    /// guess, with no assumption they are near the optimum. Reaches the
    /// configured accuracy or fails.
    pub fn assemble(&mut self, state: &mut State) -> Result<()> {
        self.solve(state, SolveMode::Assemble)
    }

    /// Incremental re-solve assuming `state` is near the previous optimum.
    /// Runs on a reduced budget with damping carried over from the last
    /// solve; escalates to a full `assemble` if that budget is not enough.
    pub fn track(&mut self, state: &mut State) -> Result<()> {
        match self.solve(state, SolveMode::Track) {
            Err(IkError::Convergence { .. }) => {
                warn!(time = state.time, "track budget exhausted, escalating to assemble");
                self.solve(state, SolveMode::Assemble)
            }
            other => other,
        }
    }

    fn solve(&mut self, state: &mut State, mode: SolveMode) -> Result<()> {
        self.table
            .refresh_targets(state.time, &self.markers, &self.coord_refs);

        let (max_iters, mut lambda) = match mode {
            SolveMode::Assemble => (ASSEMBLE_MAX_ITERS, ASSEMBLE_DAMPING),
            SolveMode::Track => (TRACK_MAX_ITERS, self.damping),
        };
        let n = self.model.ncoords();

        let mut q = state.q.clone();
        self.model.project(&mut q);
        let mut r = self.weighted_residual(&q);
        let mut cost = 0.5 * r.norm_squared();
        let mut last_step = f64::INFINITY;

        for it in 0..max_iters {
            let j = self.weighted_jacobian(&q);
            let g = j.transpose() * &r;
            let mut h = j.transpose() * &j;
            for k in 0..n {
                h[(k, k)] += lambda;
            }

            let Some(chol) = h.cholesky() else {
                // Non-finite entries; grow damping and retry.
                lambda *= DAMPING_UP;
                continue;
            };
            let dq = -chol.solve(&g);
            let mut q_trial = &q + &dq;
            self.model.project(&mut q_trial);
            // Measure the step after projection: at a range bound the raw
            // update keeps pointing outside the feasible region and would
            // never shrink below tolerance.
            let step = (&q_trial - &q).amax();
            last_step = step;
            let r_trial = self.weighted_residual(&q_trial);
            let cost_trial = 0.5 * r_trial.norm_squared();

            debug!(
                iter = it,
                cost = cost,
                cost_trial = cost_trial,
                step = step,
                lambda = lambda,
                "ik iteration"
            );

            if cost_trial.is_finite() && cost_trial <= cost {
                q = q_trial;
                r = r_trial;
                cost = cost_trial;
                lambda = (lambda * DAMPING_DOWN).max(DAMPING_MIN);

                if step <= self.accuracy {
                    state.q.copy_from(&q);
                    self.q_current.copy_from(&q);
                    self.damping = lambda;
                    return Ok(());
                }
            } else {
                lambda *= DAMPING_UP;
            }
        }

        self.damping = lambda;
        Err(IkError::Convergence {
            iterations: max_iters,
            accuracy: self.accuracy,
            step_norm: last_step,
        })
    }

    /// Total residual rows: three per marker goal, one per coordinate goal.
    fn rows(&self) -> usize {
        let nm = self.table.n_markers();
        3 * nm + (self.table.len() - nm)
    }

    /// Residual scaled by sqrt-weights, so its squared norm is the weighted
    /// objective.
    fn weighted_residual(&self, q: &DVec) -> DVec {
        let positions = self.model.marker_positions(q);
        let mut r = DVec::zeros(self.rows());
        let mut row = 0;
        for goal in self.table.goals() {
            let s = goal.effective_weight().sqrt();
            match goal.target {
                GoalTarget::Position(t) => {
                    let p = positions[goal.model_idx];
                    r[row] = s * (p.x - t.x);
                    r[row + 1] = s * (p.y - t.y);
                    r[row + 2] = s * (p.z - t.z);
                    row += 3;
                }
                GoalTarget::Value(t) => {
                    r[row] = s * (q[goal.model_idx] - t);
                    row += 1;
                }
            }
        }
        r
    }

    /// Stacked goal Jacobian scaled by sqrt-weights, with locked-coordinate
    /// columns zeroed so the optimizer never proposes moving them.
    fn weighted_jacobian(&self, q: &DVec) -> DMat {
        let n = self.model.ncoords();
        let jm = self.model.marker_jacobians(q);
        let mut j = DMat::zeros(self.rows(), n);
        let mut row = 0;
        for goal in self.table.goals() {
            let s = goal.effective_weight().sqrt();
            match goal.target {
                GoalTarget::Position(_) => {
                    let src = 3 * goal.model_idx;
                    for dr in 0..3 {
                        for col in 0..n {
                            j[(row + dr, col)] = s * jm[(src + dr, col)];
                        }
                    }
                    row += 3;
                }
                GoalTarget::Value(_) => {
                    j[(row, goal.model_idx)] = s;
                    row += 1;
                }
            }
        }
        for col in 0..n {
            if self.model.is_locked(col) {
                for r in 0..j.nrows() {
                    j[(r, col)] = 0.0;
                }
            }
        }
        j
    }

    /// Per-marker-goal unweighted Euclidean distance to the current target,
    /// at the most recently solved coordinates, in `marker_names` order.
    pub fn marker_errors(&self) -> Vec<f64> {
        let positions = self.model.marker_positions(&self.q_current);
        self.marker_goal_distances(&positions)
    }

    /// Per-marker-goal squared distance; matches the optimizer's objective
    /// terms modulo weighting.
    pub fn squared_marker_errors(&self) -> Vec<f64> {
        let positions = self.model.marker_positions(&self.q_current);
        self.table.goals()[..self.table.n_markers()]
            .iter()
            .map(|g| match g.target {
                GoalTarget::Position(t) => (positions[g.model_idx] - t).norm_squared(),
                GoalTarget::Value(_) => unreachable!("marker slots hold position targets"),
            })
            .collect()
    }

    /// Sum of squared marker distances.
    pub fn sum_squared_marker_error(&self) -> f64 {
        self.squared_marker_errors().iter().sum()
    }

    /// Per-coordinate-goal absolute difference from the current target.
    pub fn coordinate_errors(&self) -> Vec<f64> {
        self.table.goals()[self.table.n_markers()..]
            .iter()
            .map(|g| match g.target {
                GoalTarget::Value(t) => (self.q_current[g.model_idx] - t).abs(),
                GoalTarget::Position(_) => unreachable!("coordinate slots hold value targets"),
            })
            .collect()
    }

    /// Unweighted errors for every goal, combined, in table order: distances
    /// for markers, absolute differences for coordinates.
    pub fn goal_errors(&self) -> Vec<f64> {
        let positions = self.model.marker_positions(&self.q_current);
        let mut out = self.marker_goal_distances(&positions);
        out.extend(self.coordinate_errors());
        out
    }

    fn marker_goal_distances(&self, positions: &[ikfit_math::Vec3]) -> Vec<f64> {
        self.table.goals()[..self.table.n_markers()]
            .iter()
            .map(|g| match g.target {
                GoalTarget::Position(t) => (positions[g.model_idx] - t).norm(),
                GoalTarget::Value(_) => unreachable!("marker slots hold position targets"),
            })
            .collect()
    }
}
