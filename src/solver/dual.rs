//! Dual ascent step.
//!
//! Each multiplier moves by the constraint residual evaluated at the
//! extrapolated primal point, divided by the number of primal variables in
//! that constraint (the dual-side preconditioner), then is projected back to
//! `>= 0`.

use super::state::{DualState, PrimalBuffers};
use super::visibility::VisibilityBranch;
use crate::grid::RayTopology;

/// Run one dual step from the extrapolated primal point.
///
/// The visibility branch is selected from the current (non-extrapolated)
/// primal values.
pub fn dual_step(topology: &RayTopology, primal: &PrimalBuffers, duals: &mut DualState) {
    let extra = primal.extrapolated();
    let current = primal.current();
    let (coupling, mut vis_con) = duals.split_mut();

    for (_, span) in topology.spans() {
        for (pos, i) in span.enumerate() {
            let cell = topology.cell_at(i);

            if pos >= 1 {
                let prev = i - 1;

                coupling.y_occ_y_free[i] += (extra.y_occ[i] - extra.y_free[prev]) / 2.0;
                coupling.y_free_y_free[i] += (extra.y_free[i] - extra.y_free[prev]) / 2.0;

                if let Some(vis_con) = vis_con.as_deref_mut() {
                    vis_con[i] += match VisibilityBranch::select(current.y_free[prev], current.x_occ[cell]) {
                        VisibilityBranch::Linear => {
                            (extra.y_occ[i] - extra.y_free[prev] - extra.x_occ[cell] + 1.0) / 3.0
                        }
                        VisibilityBranch::Zero => extra.y_occ[i],
                    };
                }
            }

            coupling.y_occ_x_occ[i] += (extra.y_occ[i] - extra.x_occ[cell]) / 2.0;
            coupling.y_free_x_occ[i] += (extra.y_free[i] + extra.x_occ[cell] - 1.0) / 2.0;
        }
    }

    duals.project();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::state::Mode;
    use crate::task::scenes;

    fn setup(mode: Mode) -> (RayTopology, PrimalBuffers, DualState) {
        let topology = RayTopology::from_task(&scenes::section_a5(mode)).unwrap();
        let buffers = PrimalBuffers::new(&topology);
        let duals = DualState::new(mode, &topology);
        (topology, buffers, duals)
    }

    #[test]
    fn test_feasible_start_keeps_duals_at_zero() {
        // y_occ = 0, y_free = 1, x_occ = 0 satisfies every constraint; the
        // co-location residual y_free + x_occ - 1 is exactly 0
        let (topology, buffers, mut duals) = setup(Mode::Convex);
        dual_step(&topology, &buffers, &mut duals);
        assert!(duals.values().all(|v| v == 0.0));
    }

    #[test]
    fn test_chain_and_colocation_updates() {
        let (topology, mut buffers, mut duals) = setup(Mode::Convex);
        buffers.extra.y_occ = vec![2.0, 2.0, 2.0];

        dual_step(&topology, &buffers, &mut duals);

        let coupling = duals.coupling();
        // No chain constraint at the first position
        assert_eq!(coupling.y_occ_y_free, vec![0.0, 0.5, 0.5]);
        assert_eq!(coupling.y_free_y_free, vec![0.0, 0.0, 0.0]);
        assert_eq!(coupling.y_occ_x_occ, vec![1.0, 1.0, 1.0]);
        assert_eq!(coupling.y_free_x_occ, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_projection() {
        let (topology, mut buffers, mut duals) = setup(Mode::Convex);
        buffers.extra.y_free = vec![0.0, 0.0, 0.0];

        dual_step(&topology, &buffers, &mut duals);

        // y_free + x_occ - 1 = -1 would make the multiplier negative
        assert_eq!(duals.coupling().y_free_x_occ, vec![0.0, 0.0, 0.0]);
        assert!(duals.values().all(|v| v >= 0.0));
    }

    #[test]
    fn test_visibility_zero_branch_integrates_y_occ() {
        let (topology, mut buffers, mut duals) = setup(Mode::NonConvex);
        buffers.extra.y_occ = vec![2.0, 2.0, 2.0];

        dual_step(&topology, &buffers, &mut duals);

        // Current y_free = 1, x_occ = 0: branch value 0, zero piece
        assert_eq!(duals.visibility(), Some(&[0.0, 2.0, 2.0][..]));
    }

    #[test]
    fn test_visibility_linear_branch() {
        let (topology, mut buffers, mut duals) = setup(Mode::NonConvex);
        buffers.current.x_occ = vec![0.5, 0.5, 0.5];
        buffers.extra.y_occ = vec![1.0, 1.0, 1.0];
        buffers.extra.x_occ = vec![0.5, 0.5, 0.5];

        dual_step(&topology, &buffers, &mut duals);

        // (1 - 1 - 0.5 + 1) / 3
        let vis = duals.visibility().unwrap();
        assert_eq!(vis[0], 0.0);
        assert!((vis[1] - 0.5 / 3.0).abs() < 1e-12);
        assert!((vis[2] - 0.5 / 3.0).abs() < 1e-12);
    }
}
