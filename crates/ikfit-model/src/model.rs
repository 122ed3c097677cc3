//! Model description: bodies, coordinates, markers, and the builder.

use ikfit_math::{DMat, DVec, Transform, Vec3};
use ikfit_solver::{KinematicModel, State};

use crate::joint::Joint;
use crate::kinematics;

/// A rigid body attached to its parent through one joint.
///
/// Bodies are stored in topological order; `parent` is an index into the body
/// list, or -1 for the world.
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub parent: i32,
    pub joint: Joint,
}

/// One generalized coordinate. Coordinate `i` belongs to body `i`'s joint.
#[derive(Debug, Clone)]
pub struct Coordinate {
    pub name: String,
    /// Value range [lower, upper] (None = unlimited).
    pub range: Option<[f64; 2]>,
    /// Locked coordinates are pinned to `default_value` and excluded from
    /// the optimization.
    pub locked: bool,
    pub default_value: f64,
}

/// A tracking marker: a fixed point on a body.
#[derive(Debug, Clone)]
pub struct Marker {
    pub name: String,
    /// Body index the marker is attached to.
    pub body: usize,
    /// Marker location in the body frame.
    pub location: Vec3,
}

/// Static description of an articulated model.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub bodies: Vec<Body>,
    pub coordinates: Vec<Coordinate>,
    pub markers: Vec<Marker>,
    coordinate_names: Vec<String>,
    marker_names: Vec<String>,
}

impl Model {
    pub fn nbodies(&self) -> usize {
        self.bodies.len()
    }

    /// One coordinate per joint, one joint per body.
    pub fn ncoords(&self) -> usize {
        self.coordinates.len()
    }

    pub fn nmarkers(&self) -> usize {
        self.markers.len()
    }

    /// A state at time zero with every coordinate at its default value.
    pub fn default_state(&self) -> State {
        let q = DVec::from_iterator(
            self.ncoords(),
            self.coordinates.iter().map(|c| c.default_value),
        );
        State::new(0.0, q)
    }
}

impl KinematicModel for Model {
    fn ncoords(&self) -> usize {
        self.coordinates.len()
    }

    fn coordinate_names(&self) -> &[String] {
        &self.coordinate_names
    }

    fn marker_names(&self) -> &[String] {
        &self.marker_names
    }

    fn marker_positions(&self, q: &DVec) -> Vec<Vec3> {
        kinematics::marker_positions(self, q.as_slice())
    }

    fn marker_jacobians(&self, q: &DVec) -> DMat {
        kinematics::marker_jacobians(self, q.as_slice())
    }

    fn project(&self, q: &mut DVec) {
        for (i, coord) in self.coordinates.iter().enumerate() {
            if coord.locked {
                q[i] = coord.default_value;
            } else if let Some([lo, hi]) = coord.range {
                q[i] = q[i].clamp(lo, hi);
            }
        }
    }

    fn is_locked(&self, coord: usize) -> bool {
        self.coordinates[coord].locked
    }
}

/// Builder for kinematic trees. Bodies must be added parents-first.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    name: String,
    bodies: Vec<Body>,
    coordinates: Vec<Coordinate>,
    markers: Vec<Marker>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a body on a revolute joint (Z axis of the joint frame), with a
    /// named coordinate.
    pub fn add_revolute_body(
        self,
        name: &str,
        parent: i32,
        parent_to_joint: Transform,
        coordinate: &str,
    ) -> Self {
        self.add_body(name, parent, Joint::revolute(parent_to_joint), coordinate)
    }

    /// Add a body on a prismatic joint along `axis`, with a named coordinate.
    pub fn add_prismatic_body(
        self,
        name: &str,
        parent: i32,
        parent_to_joint: Transform,
        axis: Vec3,
        coordinate: &str,
    ) -> Self {
        self.add_body(
            name,
            parent,
            Joint::prismatic(parent_to_joint, axis),
            coordinate,
        )
    }

    /// Add a body with an explicit joint.
    pub fn add_body(mut self, name: &str, parent: i32, joint: Joint, coordinate: &str) -> Self {
        assert!(
            parent < self.bodies.len() as i32,
            "parent {} of body '{}' must be added first",
            parent,
            name
        );
        self.bodies.push(Body {
            name: name.to_string(),
            parent,
            joint,
        });
        self.coordinates.push(Coordinate {
            name: coordinate.to_string(),
            range: None,
            locked: false,
            default_value: 0.0,
        });
        self
    }

    /// Attach a marker to a body at a fixed body-frame location.
    pub fn add_marker(mut self, name: &str, body: usize, location: Vec3) -> Self {
        assert!(body < self.bodies.len(), "marker '{}' on unknown body", name);
        self.markers.push(Marker {
            name: name.to_string(),
            body,
            location,
        });
        self
    }

    /// Constrain a named coordinate to [lower, upper].
    pub fn coordinate_range(mut self, coordinate: &str, lower: f64, upper: f64) -> Self {
        let coord = self.coordinate_mut(coordinate);
        coord.range = Some([lower, upper]);
        self
    }

    /// Set a coordinate's default (initial) value.
    pub fn default_value(mut self, coordinate: &str, value: f64) -> Self {
        self.coordinate_mut(coordinate).default_value = value;
        self
    }

    /// Pin a coordinate to `value`; it will not move during solves.
    pub fn lock_coordinate(mut self, coordinate: &str, value: f64) -> Self {
        let coord = self.coordinate_mut(coordinate);
        coord.locked = true;
        coord.default_value = value;
        self
    }

    fn coordinate_mut(&mut self, name: &str) -> &mut Coordinate {
        self.coordinates
            .iter_mut()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("unknown coordinate '{name}'"))
    }

    pub fn build(self) -> Model {
        let coordinate_names = self.coordinates.iter().map(|c| c.name.clone()).collect();
        let marker_names = self.markers.iter().map(|m| m.name.clone()).collect();
        Model {
            name: self.name,
            bodies: self.bodies,
            coordinates: self.coordinates,
            markers: self.markers,
            coordinate_names,
            marker_names,
        }
    }
}
