//! Primal descent step.
//!
//! The deltas are the partial derivatives of the Lagrangian with respect to
//! each primal variable: the costs plus the signed dual multipliers of every
//! constraint the variable takes part in. They are accumulated for all rays
//! from the frozen dual state before any primal value changes.

use super::preconditioner::Preconditioner;
use super::state::{Coord, DualState, PrimalBuffers, PrimalVars};
use super::visibility::VisibilityBranch;
use crate::grid::{CostModel, RayTopology};

/// Delta and weight accumulation for one pass.
struct Accumulator<'a> {
    delta: &'a mut PrimalVars,
    preconditioner: &'a mut Preconditioner,
}

impl Accumulator<'_> {
    /// Add a cost term (no coupling weight).
    #[inline]
    fn cost(&mut self, coord: Coord, value: f64) {
        *self.delta.get_mut(coord) += value;
    }

    /// Add a dual coupling term with unit coefficient.
    #[inline]
    fn couple(&mut self, coord: Coord, value: f64) {
        *self.delta.get_mut(coord) += value;
        self.preconditioner.touch(coord);
    }
}

/// Accumulate the primal deltas for the current dual state.
///
/// Afterwards `delta` holds the unnormalized gradient and the preconditioner
/// holds the coupling weights of this pass.
pub fn accumulate_deltas(
    topology: &RayTopology,
    costs: &CostModel,
    duals: &DualState,
    current: &PrimalVars,
    delta: &mut PrimalVars,
    preconditioner: &mut Preconditioner,
) {
    delta.clear();
    preconditioner.begin_pass();

    let coupling = duals.coupling();
    let vis_con = duals.visibility();
    let mut acc = Accumulator {
        delta,
        preconditioner,
    };

    for (ray_ind, span) in topology.spans() {
        let last = span.end - 1;

        for (pos, i) in span.enumerate() {
            let cell = topology.cell_at(i);

            acc.cost(Coord::YOcc(i), costs.occ[i]);

            if pos >= 1 {
                let prev = i - 1;

                // y_occ[pos] <= y_free[pos - 1]
                let d = coupling.y_occ_y_free[i];
                acc.couple(Coord::YOcc(i), d);
                acc.couple(Coord::YFree(prev), -d);

                // y_free[pos] <= y_free[pos - 1]
                let d = coupling.y_free_y_free[i];
                acc.couple(Coord::YFree(i), d);
                acc.couple(Coord::YFree(prev), -d);

                if let Some(vis_con) = vis_con {
                    let d = vis_con[i];
                    acc.couple(Coord::YOcc(i), d);
                    if VisibilityBranch::select(current.y_free[prev], current.x_occ[cell]).is_linear() {
                        acc.couple(Coord::YFree(prev), -d);
                        acc.couple(Coord::XOcc(cell), -d);
                    }
                }
            }

            // y_occ[pos] <= x_occ[cell]
            let d = coupling.y_occ_x_occ[i];
            acc.couple(Coord::YOcc(i), d);
            acc.couple(Coord::XOcc(cell), -d);

            // y_free[pos] + x_occ[cell] <= 1
            let d = coupling.y_free_x_occ[i];
            acc.couple(Coord::YFree(i), d);
            acc.couple(Coord::XOcc(cell), d);
        }

        acc.cost(Coord::YFree(last), costs.free[ray_ind]);
    }
}

/// Run one primal step: accumulate, normalize, descend, clamp, extrapolate.
///
/// Returns the largest absolute change of any primal variable.
pub fn primal_step(
    topology: &RayTopology,
    costs: &CostModel,
    duals: &DualState,
    buffers: &mut PrimalBuffers,
    preconditioner: &mut Preconditioner,
    delta: &mut PrimalVars,
) -> f64 {
    accumulate_deltas(topology, costs, duals, &buffers.current, delta, preconditioner);
    buffers.descend(delta, preconditioner.weights())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::preconditioner::{fixed_weights, PreconditionerKind};
    use crate::solver::state::Mode;
    use crate::task::{scenes, RayTask};

    fn setup(task: &RayTask) -> (RayTopology, CostModel, DualState, PrimalBuffers, Preconditioner, PrimalVars) {
        let topology = RayTopology::from_task(task).unwrap();
        let costs = CostModel::from_task(task, &topology);
        let duals = DualState::new(task.mode(), &topology);
        let buffers = PrimalBuffers::new(&topology);
        let pc = Preconditioner::new(PreconditionerKind::Dynamic, &topology, task.mode()).unwrap();
        let delta = PrimalVars::zeros(&topology);
        (topology, costs, duals, buffers, pc, delta)
    }

    #[test]
    fn test_first_step_with_zero_duals() {
        let task = scenes::section_a5(Mode::Convex);
        let (topology, costs, duals, mut buffers, mut pc, mut delta) = setup(&task);

        primal_step(&topology, &costs, &duals, &mut buffers, &mut pc, &mut delta);

        assert_eq!(delta.y_occ, vec![-2.0, -3.0, -2.0]);
        assert_eq!(pc.weights().y_occ, vec![1.0, 2.0, 2.0]);
        // 0 + 2/1, 0 + 3/2, 0 + 2/2, all clamped to 1
        assert_eq!(buffers.current().y_occ, vec![1.0, 1.0, 1.0]);
        assert_eq!(buffers.extrapolated().y_occ, vec![2.0, 2.0, 2.0]);
        assert_eq!(buffers.current().y_free, vec![1.0; 3]);
        assert_eq!(buffers.current().x_occ, vec![0.0; 3]);
    }

    #[test]
    fn test_dynamic_weights_match_fixed_in_convex_mode() {
        let task = scenes::square_corners(Mode::Convex);
        let (topology, costs, duals, mut buffers, mut pc, mut delta) = setup(&task);
        primal_step(&topology, &costs, &duals, &mut buffers, &mut pc, &mut delta);
        assert_eq!(pc.weights(), &fixed_weights(&topology));
    }

    #[test]
    fn test_visibility_weights_follow_branch() {
        let task = scenes::section_a5(Mode::NonConvex);
        let (topology, costs, duals, buffers, mut pc, mut delta) = setup(&task);

        // Initial state: y_free = 1, x_occ = 0, so the branch value is 0 and
        // only the y_occ side of the constraint is counted
        accumulate_deltas(&topology, &costs, &duals, buffers.current(), &mut delta, &mut pc);
        assert_eq!(pc.weights().y_occ, vec![1.0, 3.0, 3.0]);
        assert_eq!(pc.weights().y_free, vec![3.0, 4.0, 2.0]);
        assert_eq!(pc.weights().x_occ, vec![2.0, 2.0, 2.0]);

        // Raise x_occ so the linear piece becomes active everywhere
        let mut current = buffers.current().clone();
        current.x_occ = vec![0.5; 3];
        accumulate_deltas(&topology, &costs, &duals, &current, &mut delta, &mut pc);
        assert_eq!(pc.weights().y_free, vec![4.0, 5.0, 2.0]);
        assert_eq!(pc.weights().x_occ, vec![2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_dual_terms_enter_with_signs() {
        let task = scenes::section_a5(Mode::NonConvex);
        let (topology, costs, mut duals, buffers, mut pc, mut delta) = setup(&task);
        if let DualState::NonConvex { coupling, vis_con } = &mut duals {
            coupling.y_occ_y_free[1] = 0.5;
            coupling.y_free_x_occ[2] = 0.25;
            vis_con[2] = 1.0;
        }
        let mut current = buffers.current().clone();
        current.x_occ[2] = 0.5;

        accumulate_deltas(&topology, &costs, &duals, &current, &mut delta, &mut pc);

        assert_eq!(delta.y_occ, vec![-2.0, -2.5, -1.0]);
        // y_free[0] loses the chain dual of pos 1, y_free[1] the visibility
        // dual of pos 2, y_free[2] gains its co-location dual
        assert_eq!(delta.y_free, vec![-0.5, -1.0, 0.25]);
        assert_eq!(delta.x_occ, vec![0.0, 0.0, -0.75]);
    }

    #[test]
    fn test_free_cost_on_last_position() {
        let task = scenes::square_central_cell(Mode::Convex);
        let (topology, costs, duals, buffers, mut pc, mut delta) = setup(&task);
        accumulate_deltas(&topology, &costs, &duals, buffers.current(), &mut delta, &mut pc);
        assert_eq!(delta.y_free[0..3], [0.0, 0.0, -1.0]);
        assert_eq!(delta.y_free[3..6], [0.0, 0.0, 0.0]);
    }
}
