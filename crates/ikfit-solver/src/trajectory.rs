//! Frame-by-frame trajectory driver.
//!
//! Thin orchestration over the solver: the first frame is assembled, later
//! frames are tracked, and the same `State` is mutated across frames so each
//! solve warm-starts from the previous solution.

use ikfit_math::DVec;

use crate::error::Result;
use crate::solver::InverseKinematicsSolver;
use crate::{KinematicModel, State};

/// Converged solution for one trajectory frame.
#[derive(Debug, Clone)]
pub struct TrajectoryFrame {
    pub time: f64,
    pub q: DVec,
    /// Unweighted marker distances at this frame, in marker-name order.
    pub marker_errors: Vec<f64>,
}

/// Solve a time-ordered trajectory.
///
/// `before_frame` runs before each solve and may mutate the solver, e.g. to
/// re-weight markers; weight updates made there are visible to that frame's
/// solve.
pub fn solve_trajectory<M, F>(
    solver: &mut InverseKinematicsSolver<M>,
    state: &mut State,
    times: &[f64],
    mut before_frame: F,
) -> Result<Vec<TrajectoryFrame>>
where
    M: KinematicModel,
    F: FnMut(usize, &mut InverseKinematicsSolver<M>) -> Result<()>,
{
    let mut frames = Vec::with_capacity(times.len());
    for (i, &time) in times.iter().enumerate() {
        state.time = time;
        before_frame(i, solver)?;
        if i == 0 {
            solver.assemble(state)?;
        } else {
            solver.track(state)?;
        }
        frames.push(TrajectoryFrame {
            time,
            q: state.q.clone(),
            marker_errors: solver.marker_errors(),
        });
    }
    Ok(frames)
}
