//! Task validation.

use crate::error::{RayPotentialError, Result};
use crate::task::RayTask;

use super::GridShape;

/// Validate a task before building an optimizer from it.
///
/// Checks:
/// - Grid sizes are non-empty and positive
/// - Every ray is non-empty and references cells inside the grid
/// - Occupancy costs have the same shape as the rays
/// - There is exactly one free-space cost per ray
/// - All costs are finite
///
/// Returns the validated grid shape.
pub fn validate_task(task: &RayTask) -> Result<GridShape> {
    let grid = GridShape::new(task.grid_sizes.clone())?;

    if task.ray_costs_occ.len() != task.rays.len() {
        return Err(RayPotentialError::topology(format!(
            "{} rays but {} occupancy cost rows",
            task.rays.len(),
            task.ray_costs_occ.len()
        )));
    }

    if task.ray_costs_free.len() != task.rays.len() {
        return Err(RayPotentialError::topology(format!(
            "{} rays but {} free-space costs",
            task.rays.len(),
            task.ray_costs_free.len()
        )));
    }

    for (ray_ind, (ray, costs)) in task.rays.iter().zip(&task.ray_costs_occ).enumerate() {
        if ray.is_empty() {
            return Err(RayPotentialError::topology(format!("Ray {} is empty", ray_ind)));
        }

        if costs.len() != ray.len() {
            return Err(RayPotentialError::topology(format!(
                "Ray {} has {} cells but {} occupancy costs",
                ray_ind,
                ray.len(),
                costs.len()
            )));
        }

        if let Some((pos, &cell)) = ray.iter().enumerate().find(|(_, &cell)| !grid.contains(cell)) {
            return Err(RayPotentialError::topology(format!(
                "Ray {} references cell {} at position {} outside a grid of {} cells",
                ray_ind,
                cell,
                pos,
                grid.num_cells()
            )));
        }

        if let Some(pos) = costs.iter().position(|c| !c.is_finite()) {
            return Err(RayPotentialError::NonFiniteCost { ray: ray_ind, pos });
        }
    }

    if let Some(ray) = task.ray_costs_free.iter().position(|c| !c.is_finite()) {
        return Err(RayPotentialError::NonFiniteFreeCost { ray });
    }

    Ok(grid)
}
