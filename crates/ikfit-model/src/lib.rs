//! Articulated kinematic model for the ikfit solver.
//!
//! `Model` is the static description of the kinematic tree (bodies, joints,
//! coordinates, markers); forward kinematics and marker Jacobians live in
//! [`kinematics`]. `Model` implements `ikfit_solver::KinematicModel`, making
//! it a drop-in collaborator for the solver.

pub mod joint;
pub mod kinematics;
pub mod model;

pub use joint::{Joint, JointType};
pub use kinematics::{body_transforms, marker_positions, marker_jacobians};
pub use model::{Body, Coordinate, Marker, Model, ModelBuilder};
