//! Diagonal preconditioning.
//!
//! Each primal coordinate is updated with step size `1 / max(1, w)`, where
//! `w` is the sum of absolute coefficients coupling that coordinate to the
//! constraints (every coefficient is ±1 here, so `w` is a count). This is the
//! alpha = 1 rule of Pock & Chambolle and removes the need for a global step
//! size.
//!
//! Two strategies are available:
//!
//! - [`PreconditionerKind::Dynamic`] recounts the active couplings on every
//!   primal pass. This is required in non-convex mode, where the
//!   visibility-consistency branch decides per iteration which couplings
//!   exist.
//! - [`PreconditionerKind::Fixed`] computes the counts once from the ray
//!   topology. In convex mode every coupling is always present, so the fixed
//!   counts equal the dynamic ones. It is rejected for non-convex mode.

use serde::{Deserialize, Serialize};

use super::state::{Coord, Mode, PrimalVars};
use crate::error::{RayPotentialError, Result};
use crate::grid::RayTopology;

/// Preconditioner strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreconditionerKind {
    /// Count active couplings every iteration.
    #[default]
    Dynamic,
    /// Precompute counts from static topology (convex mode only).
    Fixed,
}

/// Per-coordinate weights, with the strategy that maintains them.
#[derive(Debug, Clone)]
pub enum Preconditioner {
    /// Weights accumulated during each primal pass
    Dynamic(PrimalVars),
    /// Weights computed once at construction
    Fixed(PrimalVars),
}

impl Preconditioner {
    /// Create a preconditioner for the given topology and mode.
    pub fn new(kind: PreconditionerKind, topology: &RayTopology, mode: Mode) -> Result<Self> {
        match kind {
            PreconditionerKind::Dynamic => Ok(Preconditioner::Dynamic(PrimalVars::zeros(topology))),
            PreconditionerKind::Fixed => {
                if mode.is_nonconvex() {
                    return Err(RayPotentialError::solver_param(
                        "fixed preconditioner requires convex mode; the visibility branch changes the active couplings every iteration",
                    ));
                }
                Ok(Preconditioner::Fixed(fixed_weights(topology)))
            }
        }
    }

    /// Strategy of this preconditioner.
    pub fn kind(&self) -> PreconditionerKind {
        match self {
            Preconditioner::Dynamic(_) => PreconditionerKind::Dynamic,
            Preconditioner::Fixed(_) => PreconditionerKind::Fixed,
        }
    }

    /// Prepare for a new primal pass.
    pub(crate) fn begin_pass(&mut self) {
        if let Preconditioner::Dynamic(weights) = self {
            weights.clear();
        }
    }

    /// Record one unit coupling on a coordinate.
    #[inline]
    pub(crate) fn touch(&mut self, coord: Coord) {
        if let Preconditioner::Dynamic(weights) = self {
            *weights.get_mut(coord) += 1.0;
        }
    }

    /// Current weights (not yet floor-clamped).
    pub fn weights(&self) -> &PrimalVars {
        match self {
            Preconditioner::Dynamic(weights) | Preconditioner::Fixed(weights) => weights,
        }
    }
}

/// Closed-form coupling counts when every constraint is active.
///
/// For a ray of length `len`:
/// - `y_occ[pos]`: one co-location coupling, plus one chain coupling if
///   `pos >= 1`
/// - `y_free[pos]`: one co-location coupling, one chain coupling to its
///   predecessor if `pos >= 1`, and two chain couplings from its successor if
///   `pos + 1 < len`
/// - `x_occ[cell]`: two co-location couplings per ray position on the cell
pub fn fixed_weights(topology: &RayTopology) -> PrimalVars {
    let mut weights = PrimalVars::zeros(topology);

    for (_, span) in topology.spans() {
        let len = span.len();
        for (pos, i) in span.enumerate() {
            let has_prev = pos >= 1;
            let has_next = pos + 1 < len;
            weights.y_occ[i] = 1.0 + if has_prev { 1.0 } else { 0.0 };
            weights.y_free[i] =
                1.0 + if has_prev { 1.0 } else { 0.0 } + if has_next { 2.0 } else { 0.0 };
        }
    }

    for (cell, w) in weights.x_occ.iter_mut().enumerate() {
        *w = 2.0 * topology.degree(cell) as f64;
    }

    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::scenes;

    #[test]
    fn test_fixed_weights_single_ray() {
        let topology = RayTopology::from_task(&scenes::section_a5(Mode::Convex)).unwrap();
        let weights = fixed_weights(&topology);
        assert_eq!(weights.y_occ, vec![1.0, 2.0, 2.0]);
        // First position has no predecessor, last has no successor
        assert_eq!(weights.y_free, vec![3.0, 4.0, 2.0]);
        assert_eq!(weights.x_occ, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_fixed_weights_single_cell_ray() {
        let task = crate::task::RayTask {
            grid_sizes: vec![2],
            rays: vec![vec![1]],
            ray_costs_occ: vec![vec![0.0]],
            ray_costs_free: vec![0.0],
            nonconvex: false,
        };
        let topology = RayTopology::from_task(&task).unwrap();
        let weights = fixed_weights(&topology);
        assert_eq!(weights.y_occ, vec![1.0]);
        assert_eq!(weights.y_free, vec![1.0]);
        // Untouched cell keeps weight 0; it is floored to 1 when used
        assert_eq!(weights.x_occ, vec![0.0, 2.0]);
    }

    #[test]
    fn test_fixed_rejected_for_nonconvex() {
        let topology = RayTopology::from_task(&scenes::section_a5(Mode::NonConvex)).unwrap();
        let result = Preconditioner::new(PreconditionerKind::Fixed, &topology, Mode::NonConvex);
        assert!(matches!(result, Err(RayPotentialError::InvalidSolverParam { .. })));

        let pc = Preconditioner::new(PreconditionerKind::Dynamic, &topology, Mode::NonConvex).unwrap();
        assert_eq!(pc.kind(), PreconditionerKind::Dynamic);
    }

    #[test]
    fn test_dynamic_touch_and_reset() {
        let topology = RayTopology::from_task(&scenes::section_a5(Mode::Convex)).unwrap();
        let mut pc = Preconditioner::new(PreconditionerKind::Dynamic, &topology, Mode::Convex).unwrap();
        pc.touch(Coord::YFree(1));
        pc.touch(Coord::YFree(1));
        pc.touch(Coord::XOcc(2));
        assert_eq!(pc.weights().y_free[1], 2.0);
        assert_eq!(pc.weights().x_occ[2], 1.0);
        pc.begin_pass();
        assert!(pc.weights().values().all(|w| w == 0.0));
    }

    #[test]
    fn test_fixed_ignores_touch() {
        let topology = RayTopology::from_task(&scenes::section_a5(Mode::Convex)).unwrap();
        let mut pc = Preconditioner::new(PreconditionerKind::Fixed, &topology, Mode::Convex).unwrap();
        pc.begin_pass();
        pc.touch(Coord::YOcc(0));
        assert_eq!(pc.weights().y_occ[0], 1.0);
    }
}
