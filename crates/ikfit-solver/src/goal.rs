//! The goal table: the fixed-index list of tracking goals.
//!
//! Built once per solver from the reference providers, the table never grows,
//! shrinks, or reorders afterward. Per frame only targets, weights, and
//! active flags change, so weight vectors supplied by callers stay aligned to
//! goal indices for the solver's whole lifetime.

use ikfit_math::Vec3;
use tracing::warn;

use crate::error::{IkError, Result};
use crate::reference::{CoordinateReference, MarkersReference};
use crate::KinematicModel;

/// Goal kind; a goal's identity is its (kind, name) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    MarkerPosition,
    CoordinateValue,
}

/// Current target of a goal.
#[derive(Debug, Clone, Copy)]
pub enum GoalTarget {
    Position(Vec3),
    Value(f64),
}

/// One tracking goal: a named marker position or coordinate value target.
#[derive(Debug, Clone)]
pub struct Goal {
    pub name: String,
    pub target: GoalTarget,
    /// Non-negative. Zero excludes the goal from the optimization while it
    /// remains in the table for error reporting.
    pub weight: f64,
    /// Cleared for markers occluded at the current frame; the stored weight
    /// is untouched.
    pub active: bool,
    /// Marker index in the model, or coordinate index, depending on kind.
    pub(crate) model_idx: usize,
    /// Column in the markers reference, or index into the coordinate
    /// reference list.
    pub(crate) ref_idx: usize,
}

impl Goal {
    pub fn kind(&self) -> GoalKind {
        match self.target {
            GoalTarget::Position(_) => GoalKind::MarkerPosition,
            GoalTarget::Value(_) => GoalKind::CoordinateValue,
        }
    }

    /// Weight as seen by the optimizer: zero while inactive.
    pub(crate) fn effective_weight(&self) -> f64 {
        if self.active {
            self.weight
        } else {
            0.0
        }
    }
}

/// Fixed-index table of goals, marker goals first, coordinate goals after.
#[derive(Debug, Clone)]
pub struct GoalTable {
    goals: Vec<Goal>,
    n_markers: usize,
    marker_names: Vec<String>,
}

impl GoalTable {
    /// Build one slot per reference marker present in the model, then one per
    /// coordinate reference.
    ///
    /// Reference markers the model does not have are skipped (they cannot be
    /// tracked); a coordinate reference naming an unknown coordinate is a
    /// configuration error.
    pub fn build<M: KinematicModel>(
        model: &M,
        markers: &MarkersReference,
        coord_refs: &[CoordinateReference],
    ) -> Result<Self> {
        let mut goals = Vec::with_capacity(markers.names().len() + coord_refs.len());

        for (ref_idx, name) in markers.names().iter().enumerate() {
            let Some(model_idx) = model.marker_names().iter().position(|n| n == name) else {
                warn!(marker = %name, "reference marker not in model, skipping");
                continue;
            };
            goals.push(Goal {
                name: name.clone(),
                target: GoalTarget::Position(Vec3::zeros()),
                weight: markers.weight(ref_idx),
                active: true,
                model_idx,
                ref_idx,
            });
        }
        let n_markers = goals.len();

        for (ref_idx, cref) in coord_refs.iter().enumerate() {
            let Some(model_idx) = model
                .coordinate_names()
                .iter()
                .position(|n| n == cref.name())
            else {
                return Err(IkError::Configuration(format!(
                    "coordinate reference '{}' does not exist in the model",
                    cref.name()
                )));
            };
            goals.push(Goal {
                name: cref.name().to_string(),
                target: GoalTarget::Value(0.0),
                weight: cref.weight(),
                active: true,
                model_idx,
                ref_idx,
            });
        }

        let marker_names = goals[..n_markers].iter().map(|g| g.name.clone()).collect();
        Ok(Self {
            goals,
            n_markers,
            marker_names,
        })
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Number of marker goals; they occupy indices `0..n_markers`.
    pub fn n_markers(&self) -> usize {
        self.n_markers
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, idx: usize) -> &Goal {
        &self.goals[idx]
    }

    /// Marker goal names, in table (= weight vector) order.
    pub fn marker_names(&self) -> &[String] {
        &self.marker_names
    }

    /// Table index of a goal by identity, if present.
    pub fn index_of(&self, kind: GoalKind, name: &str) -> Option<usize> {
        self.goals
            .iter()
            .position(|g| g.kind() == kind && g.name == name)
    }

    /// Pull fresh targets from both providers at `time`.
    ///
    /// Markers occluded at the nearest sample frame go inactive for this
    /// refresh only; their stored weights are preserved.
    pub fn refresh_targets(
        &mut self,
        time: f64,
        markers: &MarkersReference,
        coord_refs: &[CoordinateReference],
    ) {
        let frame = markers.frame_at(time);
        for goal in &mut self.goals[..self.n_markers] {
            match frame.positions[goal.ref_idx] {
                Some(p) => {
                    goal.target = GoalTarget::Position(p);
                    goal.active = true;
                }
                None => goal.active = false,
            }
        }
        for goal in &mut self.goals[self.n_markers..] {
            goal.target = GoalTarget::Value(coord_refs[goal.ref_idx].value_at(time));
            goal.active = true;
        }
    }

    /// Overwrite every goal weight, in table order.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.goals.len() {
            return Err(IkError::DimensionMismatch {
                expected: self.goals.len(),
                got: weights.len(),
            });
        }
        for (goal, &w) in self.goals.iter_mut().zip(weights) {
            goal.weight = w;
        }
        Ok(())
    }

    /// Overwrite the marker-goal weights, in marker-name order.
    pub fn set_marker_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.n_markers {
            return Err(IkError::DimensionMismatch {
                expected: self.n_markers,
                got: weights.len(),
            });
        }
        for (goal, &w) in self.goals[..self.n_markers].iter_mut().zip(weights) {
            goal.weight = w;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::MarkerFrame;
    use ikfit_math::{DMat, DVec};

    struct NamesOnly {
        coords: Vec<String>,
        markers: Vec<String>,
    }

    impl KinematicModel for NamesOnly {
        fn ncoords(&self) -> usize {
            self.coords.len()
        }
        fn coordinate_names(&self) -> &[String] {
            &self.coords
        }
        fn marker_names(&self) -> &[String] {
            &self.markers
        }
        fn marker_positions(&self, _q: &DVec) -> Vec<Vec3> {
            vec![Vec3::zeros(); self.markers.len()]
        }
        fn marker_jacobians(&self, _q: &DVec) -> DMat {
            DMat::zeros(3 * self.markers.len(), self.coords.len())
        }
    }

    fn model() -> NamesOnly {
        NamesOnly {
            coords: vec!["theta".to_string()],
            markers: vec!["m0".to_string(), "mR".to_string()],
        }
    }

    fn markers_ref(names: &[&str]) -> MarkersReference {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let frame = MarkerFrame {
            time: 0.0,
            positions: vec![Some(Vec3::new(1.0, 2.0, 3.0)); names.len()],
        };
        MarkersReference::new(names, vec![frame]).unwrap()
    }

    #[test]
    fn markers_come_first_then_coordinates() {
        let coord_refs = vec![CoordinateReference::constant("theta", 0.5)];
        let table = GoalTable::build(&model(), &markers_ref(&["m0", "mR"]), &coord_refs).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.n_markers(), 2);
        assert_eq!(table.marker_names(), ["m0", "mR"]);
        assert_eq!(table.goal(2).kind(), GoalKind::CoordinateValue);
        assert_eq!(table.index_of(GoalKind::CoordinateValue, "theta"), Some(2));
    }

    #[test]
    fn unknown_reference_marker_is_skipped() {
        let table = GoalTable::build(&model(), &markers_ref(&["m0", "ghost"]), &[]).unwrap();
        assert_eq!(table.n_markers(), 1);
        assert_eq!(table.marker_names(), ["m0"]);
    }

    #[test]
    fn unknown_coordinate_is_an_error() {
        let coord_refs = vec![CoordinateReference::constant("phi", 0.5)];
        let err = GoalTable::build(&model(), &markers_ref(&["m0"]), &coord_refs);
        assert!(matches!(err, Err(IkError::Configuration(_))));
    }

    #[test]
    fn weight_vectors_must_match_table_layout() {
        let mut table = GoalTable::build(&model(), &markers_ref(&["m0", "mR"]), &[]).unwrap();
        assert!(table.set_marker_weights(&[1.0, 2.0]).is_ok());
        assert!(matches!(
            table.set_marker_weights(&[1.0]),
            Err(IkError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(table.set_weights(&[1.0, 2.0]).is_ok());
        assert_eq!(table.goal(1).weight, 2.0);
    }

    #[test]
    fn occluded_marker_goes_inactive_without_losing_weight() {
        let names = vec!["m0".to_string(), "mR".to_string()];
        let frames = vec![
            MarkerFrame {
                time: 0.0,
                positions: vec![Some(Vec3::zeros()), Some(Vec3::zeros())],
            },
            MarkerFrame {
                time: 1.0,
                positions: vec![Some(Vec3::zeros()), None],
            },
        ];
        let mref = MarkersReference::new(names, frames).unwrap();
        let mut table = GoalTable::build(&model(), &mref, &[]).unwrap();
        table.set_marker_weights(&[1.0, 5.0]).unwrap();

        table.refresh_targets(1.0, &mref, &[]);
        assert!(!table.goal(1).active);
        assert_eq!(table.goal(1).weight, 5.0);
        assert_eq!(table.goal(1).effective_weight(), 0.0);

        table.refresh_targets(0.0, &mref, &[]);
        assert!(table.goal(1).active);
        assert_eq!(table.goal(1).effective_weight(), 5.0);
    }
}
