//! Main optimizer interface.

use log::{debug, info, warn};

use crate::error::Result;
use crate::grid::{CostModel, RayTopology};
use crate::task::RayTask;

use super::dual::dual_step;
use super::dump::StateDump;
use super::preconditioner::{Preconditioner, PreconditionerKind};
use super::primal::primal_step;
use super::state::{DualState, Mode, PrimalBuffers, PrimalVars};
use super::{DEFAULT_ITERATIONS, LOG_INTERVAL};

/// Configuration for the optimizer.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Number of iterations performed by [`RayOptimizer::run`].
    pub iterations: usize,
    /// Preconditioner strategy.
    pub preconditioner: PreconditionerKind,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            preconditioner: PreconditionerKind::Dynamic,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration budget.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the preconditioner strategy.
    ///
    /// [`PreconditionerKind::Fixed`] is only accepted in convex mode.
    pub fn with_preconditioner(mut self, preconditioner: PreconditionerKind) -> Self {
        self.preconditioner = preconditioner;
        self
    }
}

/// Summary of a [`RayOptimizer::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Iterations performed by this run
    pub iterations: usize,
    /// Largest primal change in the final iteration
    pub last_primal_change: f64,
}

/// Primal-dual optimizer for ray potentials.
///
/// Each [`step`](Self::step) runs a full primal pass followed by a full dual
/// pass. The primal pass reads the duals immutably and the dual pass reads
/// the primal buffers immutably, so neither sees a partially updated state.
pub struct RayOptimizer {
    /// Rays and grid
    topology: RayTopology,
    /// Occupancy and free-space costs
    costs: CostModel,
    /// Solver configuration
    config: SolverConfig,
    /// Current, previous and extrapolated primal variables
    primal: PrimalBuffers,
    /// Dual multipliers, tagged by mode
    duals: DualState,
    /// Per-coordinate step normalization
    preconditioner: Preconditioner,
    /// Scratch space for primal deltas
    delta: PrimalVars,
    /// Completed iterations
    iterations: usize,
    /// Largest primal change of the latest step
    last_primal_change: f64,
}

impl RayOptimizer {
    /// Create an optimizer for a task with default configuration.
    pub fn new(task: &RayTask) -> Result<Self> {
        Self::with_config(task, SolverConfig::default())
    }

    /// Create an optimizer for a task with custom configuration.
    pub fn with_config(task: &RayTask, config: SolverConfig) -> Result<Self> {
        let topology = RayTopology::from_task(task)?;
        let costs = CostModel::from_task(task, &topology);
        Self::from_parts(topology, costs, task.mode(), config)
    }

    /// Create an optimizer from an already built topology and cost model.
    pub fn from_parts(
        topology: RayTopology,
        costs: CostModel,
        mode: Mode,
        config: SolverConfig,
    ) -> Result<Self> {
        let preconditioner = Preconditioner::new(config.preconditioner, &topology, mode)?;

        let unreferenced = topology.unreferenced_cells();
        if unreferenced > 0 {
            warn!(
                "{} of {} cells are not on any ray and will stay at 0",
                unreferenced,
                topology.num_cells()
            );
        }
        debug!(
            "Ray optimizer: grid {}, {} rays, {} positions, mode {}, {:?} preconditioner",
            topology.grid(),
            topology.num_rays(),
            topology.num_positions(),
            mode,
            config.preconditioner
        );

        Ok(Self {
            primal: PrimalBuffers::new(&topology),
            duals: DualState::new(mode, &topology),
            delta: PrimalVars::zeros(&topology),
            topology,
            costs,
            config,
            preconditioner,
            iterations: 0,
            last_primal_change: 0.0,
        })
    }

    /// Advance one primal-dual iteration.
    pub fn step(&mut self) {
        self.last_primal_change = primal_step(
            &self.topology,
            &self.costs,
            &self.duals,
            &mut self.primal,
            &mut self.preconditioner,
            &mut self.delta,
        );
        dual_step(&self.topology, &self.primal, &mut self.duals);
        self.iterations += 1;
    }

    /// Run the configured number of iterations.
    pub fn run(&mut self) -> RunSummary {
        self.run_with(|_, _| {})
    }

    /// Run the configured number of iterations, calling `observer` with the
    /// iteration number and the optimizer before each step.
    pub fn run_with<F>(&mut self, mut observer: F) -> RunSummary
    where
        F: FnMut(usize, &RayOptimizer),
    {
        let iterations = self.config.iterations;
        for iter in 0..iterations {
            observer(iter, self);
            self.step();

            if (iter + 1) % LOG_INTERVAL == 0 {
                debug!(
                    "iteration {}: max primal change {:.3e}",
                    self.iterations, self.last_primal_change
                );
            }
        }

        info!(
            "Finished {} iterations ({} total), last max primal change {:.3e}",
            iterations, self.iterations, self.last_primal_change
        );

        RunSummary {
            iterations,
            last_primal_change: self.last_primal_change,
        }
    }

    /// Current per-cell occupancy.
    ///
    /// This borrows the live `x_occ` array; copy it (or use
    /// [`solution_vec`](Self::solution_vec)) to keep a snapshot across steps.
    pub fn solution(&self) -> &[f64] {
        &self.primal.current().x_occ
    }

    /// Copy of the current per-cell occupancy.
    pub fn solution_vec(&self) -> Vec<f64> {
        self.solution().to_vec()
    }

    /// Current primal variables.
    pub fn primal(&self) -> &PrimalVars {
        self.primal.current()
    }

    /// Primal variables before the latest step.
    pub fn previous_primal(&self) -> &PrimalVars {
        self.primal.previous()
    }

    /// Extrapolated primal variables used by the latest dual step.
    pub fn extrapolated(&self) -> &PrimalVars {
        self.primal.extrapolated()
    }

    /// Dual multipliers.
    pub fn duals(&self) -> &DualState {
        &self.duals
    }

    /// The ray topology.
    pub fn topology(&self) -> &RayTopology {
        &self.topology
    }

    /// Optimization mode.
    pub fn mode(&self) -> Mode {
        self.duals.mode()
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Largest absolute primal change in the latest step.
    pub fn last_primal_change(&self) -> f64 {
        self.last_primal_change
    }

    /// Human-readable dump of all primal and dual arrays.
    pub fn dump(&self) -> StateDump<'_> {
        StateDump::new(self)
    }
}
