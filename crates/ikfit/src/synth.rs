//! Synthetic marker data: sample a model's markers along a coordinate
//! trajectory, optionally perturbed by Gaussian noise.
//!
//! Noise is seeded for reproducibility. With `fixed_noise` one offset is
//! drawn up front and applied to every marker in every frame; otherwise a
//! fresh offset is drawn per marker per frame.

use ikfit_math::Vec3;
use ikfit_model::Model;
use ikfit_solver::{KinematicModel, MarkerFrame, MarkersReference, Result, State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

fn noise_offset(rng: &mut StdRng, radius: f64) -> Vec3 {
    let x: f64 = rng.sample(StandardNormal);
    let y: f64 = rng.sample(StandardNormal);
    let z: f64 = rng.sample(StandardNormal);
    Vec3::new(x, y, z) * radius
}

/// Generate a `MarkersReference` from the model's markers evaluated along
/// `trajectory`. `noise_radius` scales the Gaussian perturbation; zero means
/// exact positions.
pub fn synthetic_markers(
    model: &Model,
    trajectory: &[State],
    noise_radius: f64,
    fixed_noise: bool,
    seed: u64,
) -> Result<MarkersReference> {
    let mut rng = StdRng::seed_from_u64(seed);
    let fixed = noise_offset(&mut rng, noise_radius);

    let mut frames = Vec::with_capacity(trajectory.len());
    for state in trajectory {
        let positions = model
            .marker_positions(&state.q)
            .into_iter()
            .map(|p| {
                let offset = if noise_radius == 0.0 {
                    Vec3::zeros()
                } else if fixed_noise {
                    fixed
                } else {
                    noise_offset(&mut rng, noise_radius)
                };
                Some(p + offset)
            })
            .collect();
        frames.push(MarkerFrame {
            time: state.time,
            positions,
        });
    }

    MarkersReference::new(model.marker_names().to_vec(), frames)
}
