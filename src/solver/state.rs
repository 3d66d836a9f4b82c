//! Primal and dual optimizer state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::RayTopology;

/// Optimization mode, fixed for the lifetime of an optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Convex relaxation without the visibility-consistency constraint.
    Convex,
    /// Adds the non-convex visibility-consistency constraint.
    #[default]
    NonConvex,
}

impl Mode {
    /// Mode for a `nonconvex` flag.
    pub fn from_nonconvex(nonconvex: bool) -> Self {
        if nonconvex {
            Mode::NonConvex
        } else {
            Mode::Convex
        }
    }

    /// Check if the visibility-consistency constraint is enabled.
    pub fn is_nonconvex(&self) -> bool {
        matches!(self, Mode::NonConvex)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Convex => write!(f, "convex"),
            Mode::NonConvex => write!(f, "nonconvex"),
        }
    }
}

/// One coordinate of the primal vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coord {
    /// `y_occ` at a flat ray position
    YOcc(usize),
    /// `y_free` at a flat ray position
    YFree(usize),
    /// `x_occ` of a cell
    XOcc(usize),
}

/// A full set of primal-shaped values.
///
/// Used for the primal variables themselves and for everything shaped like
/// them: previous and extrapolated values, deltas and preconditioner weights.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimalVars {
    /// "Ray first becomes occupied here", per flat ray position
    pub y_occ: Vec<f64>,
    /// "Ray is free up to and including here", per flat ray position
    pub y_free: Vec<f64>,
    /// Cell occupancy, per grid cell
    pub x_occ: Vec<f64>,
}

impl PrimalVars {
    /// Allocate with constant values per family.
    pub fn filled(topology: &RayTopology, y_occ: f64, y_free: f64, x_occ: f64) -> Self {
        Self {
            y_occ: vec![y_occ; topology.num_positions()],
            y_free: vec![y_free; topology.num_positions()],
            x_occ: vec![x_occ; topology.num_cells()],
        }
    }

    /// Starting point of the optimization: nothing occupied, everything free.
    pub fn initial(topology: &RayTopology) -> Self {
        Self::filled(topology, 0.0, 1.0, 0.0)
    }

    /// All zeros.
    pub fn zeros(topology: &RayTopology) -> Self {
        Self::filled(topology, 0.0, 0.0, 0.0)
    }

    /// Reset every value to zero.
    pub fn clear(&mut self) {
        self.y_occ.fill(0.0);
        self.y_free.fill(0.0);
        self.x_occ.fill(0.0);
    }

    /// Value of a coordinate.
    pub fn get(&self, coord: Coord) -> f64 {
        match coord {
            Coord::YOcc(i) => self.y_occ[i],
            Coord::YFree(i) => self.y_free[i],
            Coord::XOcc(c) => self.x_occ[c],
        }
    }

    /// Mutable reference to a coordinate.
    pub fn get_mut(&mut self, coord: Coord) -> &mut f64 {
        match coord {
            Coord::YOcc(i) => &mut self.y_occ[i],
            Coord::YFree(i) => &mut self.y_free[i],
            Coord::XOcc(c) => &mut self.x_occ[c],
        }
    }

    /// Iterate over all values, `y_occ` first, then `y_free`, then `x_occ`.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.y_occ
            .iter()
            .chain(&self.y_free)
            .chain(&self.x_occ)
            .copied()
    }
}

/// Double-buffered primal history.
///
/// `current` and `previous` swap roles on every primal update instead of
/// copying; `extra` holds the extrapolated point `2 * current - previous`
/// read by the dual update.
#[derive(Debug, Clone)]
pub struct PrimalBuffers {
    pub(crate) current: PrimalVars,
    pub(crate) previous: PrimalVars,
    pub(crate) extra: PrimalVars,
}

impl PrimalBuffers {
    /// Initial buffers, all three equal to the starting point.
    pub fn new(topology: &RayTopology) -> Self {
        let current = PrimalVars::initial(topology);
        Self {
            previous: current.clone(),
            extra: current.clone(),
            current,
        }
    }

    /// Primal variables after the latest update.
    pub fn current(&self) -> &PrimalVars {
        &self.current
    }

    /// Primal variables before the latest update.
    pub fn previous(&self) -> &PrimalVars {
        &self.previous
    }

    /// Extrapolated primal variables.
    pub fn extrapolated(&self) -> &PrimalVars {
        &self.extra
    }

    /// Apply a preconditioned descent step.
    ///
    /// Swaps the buffers so the old values become `previous`, then writes
    /// `current = clamp01(previous - delta / max(1, weight))` and
    /// `extra = 2 * current - previous`. Returns the largest absolute change.
    pub(crate) fn descend(&mut self, delta: &PrimalVars, weights: &PrimalVars) -> f64 {
        std::mem::swap(&mut self.current, &mut self.previous);

        let y_occ = descend_family(
            &mut self.current.y_occ,
            &self.previous.y_occ,
            &delta.y_occ,
            &weights.y_occ,
            &mut self.extra.y_occ,
        );
        let y_free = descend_family(
            &mut self.current.y_free,
            &self.previous.y_free,
            &delta.y_free,
            &weights.y_free,
            &mut self.extra.y_free,
        );
        let x_occ = descend_family(
            &mut self.current.x_occ,
            &self.previous.x_occ,
            &delta.x_occ,
            &weights.x_occ,
            &mut self.extra.x_occ,
        );

        y_occ.max(y_free).max(x_occ)
    }
}

fn descend_family(
    current: &mut [f64],
    previous: &[f64],
    delta: &[f64],
    weights: &[f64],
    extra: &mut [f64],
) -> f64 {
    let mut max_change = 0.0f64;
    for i in 0..current.len() {
        let step = delta[i] / weights[i].max(1.0);
        let value = clamp01(previous[i] - step);
        current[i] = value;
        extra[i] = 2.0 * value - previous[i];
        max_change = max_change.max((value - previous[i]).abs());
    }
    max_change
}

/// Clamp to the unit interval.
#[inline]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Multipliers of the four coupling constraint families.
///
/// All arrays are indexed by flat ray position. The chain multipliers
/// (`y_occ_y_free`, `y_free_y_free`) at the first position of a ray have no
/// constraint attached and stay zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingDuals {
    /// `y_occ[pos] <= y_free[pos - 1]`
    pub y_occ_y_free: Vec<f64>,
    /// `y_free[pos] <= y_free[pos - 1]`
    pub y_free_y_free: Vec<f64>,
    /// `y_occ[pos] <= x_occ[cell]`
    pub y_occ_x_occ: Vec<f64>,
    /// `y_free[pos] + x_occ[cell] <= 1`
    pub y_free_x_occ: Vec<f64>,
}

impl CouplingDuals {
    fn zeros(len: usize) -> Self {
        Self {
            y_occ_y_free: vec![0.0; len],
            y_free_y_free: vec![0.0; len],
            y_occ_x_occ: vec![0.0; len],
            y_free_x_occ: vec![0.0; len],
        }
    }

    fn project(&mut self) {
        project_nonneg(&mut self.y_occ_y_free);
        project_nonneg(&mut self.y_free_y_free);
        project_nonneg(&mut self.y_occ_x_occ);
        project_nonneg(&mut self.y_free_x_occ);
    }

    /// Named arrays, in dump order.
    pub fn families(&self) -> [(&'static str, &[f64]); 4] {
        [
            ("dual_y_occ_y_free", self.y_occ_y_free.as_slice()),
            ("dual_y_free_y_free", self.y_free_y_free.as_slice()),
            ("dual_y_occ_x_occ", self.y_occ_x_occ.as_slice()),
            ("dual_y_free_x_occ", self.y_free_x_occ.as_slice()),
        ]
    }
}

/// Dual state, tagged by mode.
#[derive(Debug, Clone, PartialEq)]
pub enum DualState {
    /// Coupling multipliers only.
    Convex(CouplingDuals),
    /// Coupling multipliers plus the visibility-consistency multipliers.
    NonConvex {
        coupling: CouplingDuals,
        /// `y_occ[pos] <= max(0, y_free[pos - 1] + x_occ[cell] - 1)`
        vis_con: Vec<f64>,
    },
}

impl DualState {
    /// All-zero duals for the given mode.
    pub fn new(mode: Mode, topology: &RayTopology) -> Self {
        let len = topology.num_positions();
        match mode {
            Mode::Convex => DualState::Convex(CouplingDuals::zeros(len)),
            Mode::NonConvex => DualState::NonConvex {
                coupling: CouplingDuals::zeros(len),
                vis_con: vec![0.0; len],
            },
        }
    }

    /// Mode this state was built for.
    pub fn mode(&self) -> Mode {
        match self {
            DualState::Convex(_) => Mode::Convex,
            DualState::NonConvex { .. } => Mode::NonConvex,
        }
    }

    /// Coupling multipliers.
    pub fn coupling(&self) -> &CouplingDuals {
        match self {
            DualState::Convex(coupling) | DualState::NonConvex { coupling, .. } => coupling,
        }
    }

    /// Visibility-consistency multipliers, present in non-convex mode only.
    pub fn visibility(&self) -> Option<&[f64]> {
        match self {
            DualState::Convex(_) => None,
            DualState::NonConvex { vis_con, .. } => Some(vis_con.as_slice()),
        }
    }

    pub(crate) fn split_mut(&mut self) -> (&mut CouplingDuals, Option<&mut [f64]>) {
        match self {
            DualState::Convex(coupling) => (coupling, None),
            DualState::NonConvex { coupling, vis_con } => (coupling, Some(vis_con.as_mut_slice())),
        }
    }

    /// Project every multiplier onto `>= 0`.
    pub(crate) fn project(&mut self) {
        let (coupling, vis_con) = self.split_mut();
        coupling.project();
        if let Some(vis_con) = vis_con {
            project_nonneg(vis_con);
        }
    }

    /// Iterate over all multipliers.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let coupling = self.coupling();
        coupling
            .y_occ_y_free
            .iter()
            .chain(&coupling.y_free_y_free)
            .chain(&coupling.y_occ_x_occ)
            .chain(&coupling.y_free_x_occ)
            .chain(self.visibility().unwrap_or(&[]))
            .copied()
    }
}

fn project_nonneg(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v = v.max(0.0);
    }
}
