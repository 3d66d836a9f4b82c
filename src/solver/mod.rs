//! First-order primal-dual solver.
//!
//! This module provides the numerical engine for ray potential optimization.
//!
//! ## Problem
//!
//! For every ray position there are two relaxed indicators, `y_occ` ("the ray
//! first becomes occupied here") and `y_free` ("the ray is free up to and
//! including here"). Every grid cell has one occupancy `x_occ` shared by all
//! rays through it. All primal variables live in `[0, 1]`. The costs are
//! linear and the constraints are:
//!
//! ```text
//! y_occ[pos]  <= y_free[pos - 1]                               (pos >= 1)
//! y_free[pos] <= y_free[pos - 1]                               (pos >= 1)
//! y_occ[pos]  <= x_occ[cell]
//! y_free[pos] + x_occ[cell] <= 1
//! y_occ[pos]  <= max(0, y_free[pos - 1] + x_occ[cell] - 1)     (non-convex mode)
//! ```
//!
//! The last one is the visibility-consistency constraint. Without it the
//! relaxation can settle on fractional solutions that cannot be rounded.
//!
//! ## Iteration
//!
//! Each iteration is one step of the Pock–Chambolle primal-dual method with
//! diagonal preconditioning (alpha = 1):
//!
//! 1. Accumulate the primal gradient from the costs and current duals
//! 2. Divide by the per-coordinate coupling count, descend, clamp to `[0, 1]`
//! 3. Extrapolate `2 * new - old`
//! 4. Ascend the duals using the extrapolated point, clamp to `>= 0`
//!
//! There is no convergence test: the caller chooses the iteration budget.

mod dual;
mod dump;
mod optimizer;
mod preconditioner;
mod primal;
mod state;
mod visibility;

pub use dual::dual_step;
pub use dump::StateDump;
pub use optimizer::{RayOptimizer, RunSummary, SolverConfig};
pub use preconditioner::{fixed_weights, Preconditioner, PreconditionerKind};
pub use primal::{accumulate_deltas, primal_step};
pub use state::{clamp01, Coord, CouplingDuals, DualState, Mode, PrimalBuffers, PrimalVars};
pub use visibility::{linear_branch, VisibilityBranch};

/// Default iteration budget.
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Iterations between progress log messages.
pub const LOG_INTERVAL: usize = 100;
