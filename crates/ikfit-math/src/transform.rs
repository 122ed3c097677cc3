//! Rigid-body transforms (rotation + translation).
//!
//! Convention: a `Transform` maps points from the local frame to the frame
//! it is expressed in, p' = R p + t. Composing `a.compose(&b)` applies `b`
//! first, then `a`.

use crate::{Mat3, Vec3};
use nalgebra as na;

/// Rigid transform: rotation R and translation t.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    /// Rotation of the local frame expressed in the outer frame.
    pub rot: Mat3,
    /// Position of the local frame's origin in the outer frame.
    pub pos: Vec3,
}

impl Transform {
    /// Create from rotation matrix and translation.
    pub fn new(rot: Mat3, pos: Vec3) -> Self {
        Self { rot, pos }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            rot: Mat3::identity(),
            pos: Vec3::zeros(),
        }
    }

    /// Pure translation.
    pub fn translation(pos: Vec3) -> Self {
        Self {
            rot: Mat3::identity(),
            pos,
        }
    }

    /// Rotation about an arbitrary axis.
    pub fn rot_axis(axis: &na::Unit<Vec3>, angle: f64) -> Self {
        let rot = na::Rotation3::from_axis_angle(axis, angle);
        Self {
            rot: *rot.matrix(),
            pos: Vec3::zeros(),
        }
    }

    /// Pure rotation about the Z axis.
    pub fn rot_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rot: Mat3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0),
            pos: Vec3::zeros(),
        }
    }

    /// self ∘ other: apply `other` first, then `self`.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            rot: self.rot * other.rot,
            pos: self.rot * other.pos + self.pos,
        }
    }

    /// Map a point from the local frame to the outer frame.
    #[inline]
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        self.rot * p + self.pos
    }

    /// Rotate a direction (no translation).
    #[inline]
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        self.rot * v
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Transform {
        let rt = self.rot.transpose();
        Transform {
            rot: rt,
            pos: -(rt * self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compose_applies_right_transform_first() {
        let a = Transform::translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Transform::rot_z(std::f64::consts::FRAC_PI_2);
        let p = Vec3::new(1.0, 0.0, 0.0);

        // b rotates x̂ onto ŷ, then a shifts by x̂
        let q = a.compose(&b).transform_point(&p);
        assert_relative_eq!(q.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inverse_roundtrips_points() {
        let t = Transform::rot_z(0.7).compose(&Transform::translation(Vec3::new(0.3, -1.2, 2.0)));
        let p = Vec3::new(0.5, 0.25, -0.75);
        let q = t.inverse().transform_point(&t.transform_point(&p));
        assert_relative_eq!((q - p).norm(), 0.0, epsilon = 1e-12);
    }
}
