//! Forward kinematics — body transforms, marker positions, and the geometric
//! marker Jacobian.

use ikfit_math::{DMat, Transform, Vec3};

use crate::joint::JointType;
use crate::model::Model;

/// Body-to-world transforms at coordinates `q`, in body order.
pub fn body_transforms(model: &Model, q: &[f64]) -> Vec<Transform> {
    let nb = model.nbodies();
    let mut x_world = vec![Transform::identity(); nb];

    for i in 0..nb {
        let body = &model.bodies[i];
        let x_joint = body.joint.transform(q[i]);
        x_world[i] = if body.parent < 0 {
            x_joint
        } else {
            x_world[body.parent as usize].compose(&x_joint)
        };
    }

    x_world
}

/// World positions of all model markers at `q`, in marker order.
pub fn marker_positions(model: &Model, q: &[f64]) -> Vec<Vec3> {
    let x_world = body_transforms(model, q);
    model
        .markers
        .iter()
        .map(|m| x_world[m.body].transform_point(&m.location))
        .collect()
}

/// Geometric Jacobian of all marker positions: stacked 3-row blocks, one per
/// marker, `(3 * nmarkers) x ncoords`.
///
/// Column `j` of a marker's block is non-zero only when joint `j` is on the
/// path from the world to the marker's body: `a × (p − o)` for a revolute
/// joint with world axis `a` through point `o`, and `a` for a prismatic one.
pub fn marker_jacobians(model: &Model, q: &[f64]) -> DMat {
    let nb = model.nbodies();
    let x_world = body_transforms(model, q);

    // Pre-motion joint frames: world axis and origin per joint.
    let mut axis_w = vec![Vec3::zeros(); nb];
    let mut origin_w = vec![Vec3::zeros(); nb];
    for (i, body) in model.bodies.iter().enumerate() {
        let x_parent = if body.parent < 0 {
            Transform::identity()
        } else {
            x_world[body.parent as usize]
        };
        let x_joint = x_parent.compose(&body.joint.parent_to_joint);
        axis_w[i] = x_joint.transform_vector(&body.joint.axis);
        origin_w[i] = x_joint.pos;
    }

    let mut jac = DMat::zeros(3 * model.nmarkers(), model.ncoords());
    for (mi, marker) in model.markers.iter().enumerate() {
        let p = x_world[marker.body].transform_point(&marker.location);
        let mut b = marker.body as i32;
        while b >= 0 {
            let bi = b as usize;
            let body = &model.bodies[bi];
            let col = match body.joint.joint_type {
                JointType::Revolute => axis_w[bi].cross(&(p - origin_w[bi])),
                JointType::Prismatic => axis_w[bi],
            };
            jac[(3 * mi, bi)] = col.x;
            jac[(3 * mi + 1, bi)] = col.y;
            jac[(3 * mi + 2, bi)] = col.z;
            b = body.parent;
        }
    }
    jac
}
