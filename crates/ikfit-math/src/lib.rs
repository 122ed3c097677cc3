//! Math primitives for the ikfit inverse-kinematics engine.
//!
//! Thin aliases over nalgebra plus a rigid-body `Transform` used by the
//! forward-kinematics and marker-Jacobian code.

pub mod transform;

pub use transform::Transform;

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;
/// Dynamic vector.
pub type DVec = na::DVector<f64>;
/// Dynamic matrix.
pub type DMat = na::DMatrix<f64>;
