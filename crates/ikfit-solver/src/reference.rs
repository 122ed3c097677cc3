//! Reference providers: time-indexed marker targets and coordinate targets.
//!
//! These are the observation side of the problem. A `MarkersReference` holds
//! sampled 3D target positions per named marker (with occlusion gaps); a
//! `CoordinateReference` supplies a target value for one named coordinate as
//! a function of time.

use std::collections::HashMap;

use ikfit_math::Vec3;

use crate::error::{IkError, Result};

/// One sample frame of marker observations.
///
/// `positions` is aligned to the owning reference's name order; `None` means
/// the marker was not observed (occluded) at this time.
#[derive(Debug, Clone)]
pub struct MarkerFrame {
    pub time: f64,
    pub positions: Vec<Option<Vec3>>,
}

/// Named, time-sampled marker targets with per-marker weights.
#[derive(Debug, Clone)]
pub struct MarkersReference {
    names: Vec<String>,
    frames: Vec<MarkerFrame>,
    default_weight: f64,
    weight_overrides: HashMap<String, f64>,
}

impl MarkersReference {
    /// Build from marker names and time-ordered sample frames.
    ///
    /// Every frame must carry one position slot per name, and frame times
    /// must be strictly increasing.
    pub fn new(names: Vec<String>, frames: Vec<MarkerFrame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(IkError::Configuration(
                "markers reference needs at least one frame".into(),
            ));
        }
        for frame in &frames {
            if frame.positions.len() != names.len() {
                return Err(IkError::DimensionMismatch {
                    expected: names.len(),
                    got: frame.positions.len(),
                });
            }
        }
        if frames.windows(2).any(|w| w[1].time <= w[0].time) {
            return Err(IkError::Configuration(
                "marker frame times must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            names,
            frames,
            default_weight: 1.0,
            weight_overrides: HashMap::new(),
        })
    }

    /// Marker names, fixed order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Weight applied to any marker without an explicit override.
    pub fn set_default_weight(&mut self, weight: f64) {
        self.default_weight = weight;
    }

    /// Override the weight of one named marker.
    pub fn set_weight(&mut self, name: &str, weight: f64) -> Result<()> {
        if !self.names.iter().any(|n| n == name) {
            return Err(IkError::Configuration(format!(
                "unknown marker '{name}' in weight override"
            )));
        }
        self.weight_overrides.insert(name.to_string(), weight);
        Ok(())
    }

    /// Weight of the marker at `idx` in name order.
    pub fn weight(&self, idx: usize) -> f64 {
        self.weight_overrides
            .get(&self.names[idx])
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// The sample frame nearest to `time`.
    pub fn frame_at(&self, time: f64) -> &MarkerFrame {
        let i = match self
            .frames
            .binary_search_by(|f| f.time.total_cmp(&time))
        {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) if i == self.frames.len() => i - 1,
            Err(i) => {
                if time - self.frames[i - 1].time <= self.frames[i].time - time {
                    i - 1
                } else {
                    i
                }
            }
        };
        &self.frames[i]
    }
}

/// Target value for one named coordinate over time.
#[derive(Debug, Clone)]
pub struct CoordinateReference {
    name: String,
    weight: f64,
    value: ValueSource,
}

#[derive(Debug, Clone)]
enum ValueSource {
    Constant(f64),
    PiecewiseLinear { times: Vec<f64>, values: Vec<f64> },
}

impl CoordinateReference {
    /// A constant target value.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            weight: 1.0,
            value: ValueSource::Constant(value),
        }
    }

    /// A sampled target, linearly interpolated between samples and clamped at
    /// the ends.
    pub fn piecewise_linear(
        name: impl Into<String>,
        times: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if times.is_empty() || times.len() != values.len() {
            return Err(IkError::DimensionMismatch {
                expected: times.len().max(1),
                got: values.len(),
            });
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(IkError::Configuration(
                "coordinate reference times must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            name: name.into(),
            weight: 1.0,
            value: ValueSource::PiecewiseLinear { times, values },
        })
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Target value at `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        match &self.value {
            ValueSource::Constant(v) => *v,
            ValueSource::PiecewiseLinear { times, values } => {
                match times.binary_search_by(|t| t.total_cmp(&time)) {
                    Ok(i) => values[i],
                    Err(0) => values[0],
                    Err(i) if i == times.len() => values[times.len() - 1],
                    Err(i) => {
                        let s = (time - times[i - 1]) / (times[i] - times[i - 1]);
                        values[i - 1] + s * (values[i] - values[i - 1])
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_frame_reference() -> MarkersReference {
        let names = vec!["a".to_string(), "b".to_string()];
        let frames = vec![
            MarkerFrame {
                time: 0.0,
                positions: vec![Some(Vec3::new(1.0, 0.0, 0.0)), None],
            },
            MarkerFrame {
                time: 1.0,
                positions: vec![Some(Vec3::new(2.0, 0.0, 0.0)), Some(Vec3::zeros())],
            },
        ];
        MarkersReference::new(names, frames).unwrap()
    }

    #[test]
    fn frame_lookup_picks_nearest_sample() {
        let mref = two_frame_reference();
        assert_relative_eq!(mref.frame_at(0.3).time, 0.0);
        assert_relative_eq!(mref.frame_at(0.7).time, 1.0);
        assert_relative_eq!(mref.frame_at(-5.0).time, 0.0);
        assert_relative_eq!(mref.frame_at(5.0).time, 1.0);
    }

    #[test]
    fn weight_override_beats_default() {
        let mut mref = two_frame_reference();
        mref.set_default_weight(2.0);
        mref.set_weight("b", 7.0).unwrap();
        assert_relative_eq!(mref.weight(0), 2.0);
        assert_relative_eq!(mref.weight(1), 7.0);
        assert!(mref.set_weight("nope", 1.0).is_err());
    }

    #[test]
    fn frame_width_mismatch_rejected() {
        let err = MarkersReference::new(
            vec!["a".to_string()],
            vec![MarkerFrame {
                time: 0.0,
                positions: vec![],
            }],
        );
        assert!(matches!(
            err,
            Err(IkError::DimensionMismatch { expected: 1, got: 0 })
        ));
    }

    #[test]
    fn piecewise_linear_interpolates_and_clamps() {
        let cref =
            CoordinateReference::piecewise_linear("q", vec![0.0, 2.0], vec![1.0, 3.0]).unwrap();
        assert_relative_eq!(cref.value_at(1.0), 2.0);
        assert_relative_eq!(cref.value_at(-1.0), 1.0);
        assert_relative_eq!(cref.value_at(9.0), 3.0);
        assert_relative_eq!(cref.value_at(2.0), 3.0);
    }

    #[test]
    fn constant_reference_ignores_time() {
        let cref = CoordinateReference::constant("q", 0.5).with_weight(3.0);
        assert_relative_eq!(cref.value_at(0.0), 0.5);
        assert_relative_eq!(cref.value_at(100.0), 0.5);
        assert_relative_eq!(cref.weight(), 3.0);
    }
}
