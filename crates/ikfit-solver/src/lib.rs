//! Inverse-kinematics solver core.
//!
//! `InverseKinematicsSolver` drives the generalized coordinates of an
//! articulated model toward observed marker positions and target coordinate
//! values, as a weighted nonlinear least-squares problem. The model itself is
//! a collaborator behind the [`KinematicModel`] trait; reference data comes
//! in through [`MarkersReference`] and [`CoordinateReference`].

pub mod error;
pub mod goal;
pub mod reference;
pub mod solver;
pub mod trajectory;

pub use error::{IkError, Result};
pub use goal::{Goal, GoalKind, GoalTable, GoalTarget};
pub use reference::{CoordinateReference, MarkerFrame, MarkersReference};
pub use solver::InverseKinematicsSolver;
pub use trajectory::{solve_trajectory, TrajectoryFrame};

use ikfit_math::{DMat, DVec, Vec3};

/// Generalized-coordinate state of a model at one instant.
///
/// Owned by the caller and mutated in place by `assemble`/`track`; the solver
/// never holds more than the current frame.
#[derive(Debug, Clone)]
pub struct State {
    /// Sample time, used to query the reference providers.
    pub time: f64,
    /// Generalized coordinates, one per model degree of freedom.
    pub q: DVec,
}

impl State {
    /// State at time zero with all coordinates zero.
    pub fn zeros(ncoords: usize) -> Self {
        Self {
            time: 0.0,
            q: DVec::zeros(ncoords),
        }
    }

    /// State from an explicit coordinate vector.
    pub fn new(time: f64, q: DVec) -> Self {
        Self { time, q }
    }
}

/// Forward map of an articulated model: coordinates in, marker positions and
/// their sensitivities out.
///
/// Implementations must keep `marker_names` order stable; the solver indexes
/// positions and Jacobian blocks by that order. All methods are pure
/// functions of `q`, which keeps the solver testable against mock models.
pub trait KinematicModel {
    /// Number of generalized coordinates.
    fn ncoords(&self) -> usize;

    /// Coordinate names, in coordinate-vector order.
    fn coordinate_names(&self) -> &[String];

    /// Marker names, in the order `marker_positions`/`marker_jacobians` use.
    fn marker_names(&self) -> &[String];

    /// World positions of all model markers at `q`.
    fn marker_positions(&self, q: &DVec) -> Vec<Vec3>;

    /// Marker sensitivities at `q`: stacked 3-row blocks, one per marker in
    /// `marker_names` order, so the result is `(3 * markers) x ncoords`.
    fn marker_jacobians(&self, q: &DVec) -> DMat;

    /// Project `q` onto the model's coordinate constraints (range clamps,
    /// locked values). Called after every candidate step.
    fn project(&self, _q: &mut DVec) {}

    /// Whether coordinate `coord` is locked. Locked coordinates take no part
    /// in the optimization.
    fn is_locked(&self, _coord: usize) -> bool {
        false
    }
}
