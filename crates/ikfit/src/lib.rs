//! ikfit — inverse-kinematics marker tracking for articulated rigid-body
//! models.
//!
//! This umbrella crate re-exports the solver core, the concrete model, and
//! the math primitives, and adds synthetic marker-data generation for tests
//! and examples.

pub mod synth;

pub use ikfit_math::{self as math, DMat, DVec, Mat3, Transform, Vec3};
pub use ikfit_model::{
    self as model, Body, Coordinate, Joint, JointType, Marker, Model, ModelBuilder,
};
pub use ikfit_solver::{
    self as solver, solve_trajectory, CoordinateReference, Goal, GoalKind, GoalTable, GoalTarget,
    IkError, InverseKinematicsSolver, KinematicModel, MarkerFrame, MarkersReference, Result,
    State, TrajectoryFrame,
};
