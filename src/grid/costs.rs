//! Cost tables attached to rays.

use super::RayTopology;
use crate::task::RayTask;

/// Occupancy and free-space costs in flat layout.
#[derive(Debug, Clone)]
pub struct CostModel {
    /// Occupancy cost per flat ray position
    pub occ: Vec<f64>,
    /// Free-space cost per ray, charged at its last position
    pub free: Vec<f64>,
}

impl CostModel {
    /// Flatten the cost tables of a task that `topology` was built from.
    pub fn from_task(task: &RayTask, topology: &RayTopology) -> Self {
        let mut occ = Vec::with_capacity(topology.num_positions());
        for costs in &task.ray_costs_occ {
            occ.extend_from_slice(costs);
        }
        debug_assert_eq!(occ.len(), topology.num_positions());

        Self {
            occ,
            free: task.ray_costs_free.clone(),
        }
    }
}
