//! Ray topology over a grid.

use std::ops::Range;

use super::types::GridShape;
use super::validate::validate_task;
use crate::error::Result;
use crate::task::RayTask;

/// All rays of a task, stored flattened.
///
/// Every `(ray, pos)` pair maps to one flat position index
/// `offsets[ray] + pos`, so per-ray-per-position variables live in a single
/// `Vec<f64>` of length [`num_positions`](Self::num_positions).
#[derive(Debug, Clone)]
pub struct RayTopology {
    /// Grid the rays run through
    grid: GridShape,
    /// Cells of all rays, concatenated
    cells: Vec<usize>,
    /// Start of each ray in `cells`, plus a final end marker
    offsets: Vec<usize>,
    /// Number of ray positions referencing each cell
    degree: Vec<usize>,
}

impl RayTopology {
    /// Build the topology of a task, validating it first.
    pub fn from_task(task: &RayTask) -> Result<Self> {
        let grid = validate_task(task)?;
        Ok(Self::from_rays(grid, &task.rays))
    }

    /// Build the topology from rays already known to be valid for `grid`.
    pub(crate) fn from_rays(grid: GridShape, rays: &[Vec<usize>]) -> Self {
        let total: usize = rays.iter().map(Vec::len).sum();
        let mut cells = Vec::with_capacity(total);
        let mut offsets = Vec::with_capacity(rays.len() + 1);
        let mut degree = vec![0usize; grid.num_cells()];

        offsets.push(0);
        for ray in rays {
            for &cell in ray {
                degree[cell] += 1;
            }
            cells.extend_from_slice(ray);
            offsets.push(cells.len());
        }

        Self {
            grid,
            cells,
            offsets,
            degree,
        }
    }

    /// The grid shape.
    pub fn grid(&self) -> &GridShape {
        &self.grid
    }

    /// Number of grid cells.
    pub fn num_cells(&self) -> usize {
        self.grid.num_cells()
    }

    /// Number of rays.
    pub fn num_rays(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of ray positions over all rays.
    pub fn num_positions(&self) -> usize {
        self.cells.len()
    }

    /// Range of flat position indices covered by a ray.
    pub fn ray_span(&self, ray: usize) -> Range<usize> {
        self.offsets[ray]..self.offsets[ray + 1]
    }

    /// Cells along a ray.
    pub fn ray(&self, ray: usize) -> &[usize] {
        &self.cells[self.ray_span(ray)]
    }

    /// Iterate over `(ray, span)` for every ray.
    pub fn spans(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        self.offsets
            .windows(2)
            .enumerate()
            .map(|(ray, w)| (ray, w[0]..w[1]))
    }

    /// Cell at a flat position index.
    pub fn cell_at(&self, index: usize) -> usize {
        self.cells[index]
    }

    /// Number of ray positions that reference a cell.
    pub fn degree(&self, cell: usize) -> usize {
        self.degree[cell]
    }

    /// Number of cells no ray passes through.
    pub fn unreferenced_cells(&self) -> usize {
        self.degree.iter().filter(|&&d| d == 0).count()
    }

    /// Split a flat per-position array into one slice per ray.
    pub fn split<'a>(&self, values: &'a [f64]) -> Vec<&'a [f64]> {
        debug_assert_eq!(values.len(), self.num_positions());
        self.spans().map(|(_, span)| &values[span]).collect()
    }
}
