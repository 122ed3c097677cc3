//! Joint types and definitions.

use ikfit_math::{Transform, Vec3};
use nalgebra as na;

/// Joint type enumeration. Every joint carries exactly one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointType {
    /// Single rotational DOF about an axis.
    Revolute,
    /// Single translational DOF along an axis.
    Prismatic,
}

/// A joint connecting a body to its parent.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Joint type.
    pub joint_type: JointType,
    /// Transform from the parent body frame to the joint frame (constant).
    pub parent_to_joint: Transform,
    /// Joint axis in the joint frame.
    pub axis: Vec3,
}

impl Joint {
    /// Revolute joint about the Z axis of the joint frame.
    pub fn revolute(parent_to_joint: Transform) -> Self {
        Self {
            joint_type: JointType::Revolute,
            parent_to_joint,
            axis: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Revolute joint about an arbitrary axis.
    pub fn revolute_about(parent_to_joint: Transform, axis: Vec3) -> Self {
        Self {
            joint_type: JointType::Revolute,
            parent_to_joint,
            axis,
        }
    }

    /// Prismatic joint along an axis of the joint frame.
    pub fn prismatic(parent_to_joint: Transform, axis: Vec3) -> Self {
        Self {
            joint_type: JointType::Prismatic,
            parent_to_joint,
            axis,
        }
    }

    /// Parent-to-child transform at joint coordinate `q`.
    pub fn transform(&self, q: f64) -> Transform {
        let motion = match self.joint_type {
            JointType::Revolute => {
                Transform::rot_axis(&na::Unit::new_normalize(self.axis), q)
            }
            JointType::Prismatic => Transform::translation(self.axis * q),
        };
        self.parent_to_joint.compose(&motion)
    }
}
