//! Built-in example scenes.
//!
//! These are small hand-made tasks with a known desired labeling, useful for
//! exercising the optimizer end to end:
//!
//! | Scene | Grid | Rays | Desired occupancy |
//! |-------|------|------|-------------------|
//! | `SectionA5` | 1x1x3 | 1 | `[0, 1, *]` |
//! | `SquareCentralCell` | 1x3x3 | 12 | center cell only |
//! | `SquareCorners` | 1x3x3 | 12 | the four corners |
//!
//! The 1x3x3 scenes look at every row and every column of the square from
//! both ends.

use super::RayTask;
use crate::grid::GridShape;
use crate::solver::Mode;

/// A built-in example scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// A single ray through three cells with costs `[-2, -3, -2]`.
    ///
    /// The convex relaxation gets stuck at an all-0.5 solution here; the
    /// visibility-consistency constraint recovers `[0, 1, *]`.
    SectionA5,
    /// 3x3 square where only the middle row and column favor occupancy.
    SquareCentralCell,
    /// 3x3 square where only the border rows and columns favor occupancy.
    SquareCorners,
}

impl Scene {
    /// All scenes, in presentation order.
    pub const ALL: [Scene; 3] = [Scene::SectionA5, Scene::SquareCentralCell, Scene::SquareCorners];

    /// Short identifier used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Scene::SectionA5 => "a5",
            Scene::SquareCentralCell => "central-cell",
            Scene::SquareCorners => "corners",
        }
    }

    /// Build the task for this scene in the given mode.
    pub fn build(&self, mode: Mode) -> RayTask {
        match self {
            Scene::SectionA5 => section_a5(mode),
            Scene::SquareCentralCell => square_central_cell(mode),
            Scene::SquareCorners => square_corners(mode),
        }
    }

    /// Desired per-cell occupancy; `None` marks cells whose value does not
    /// matter.
    pub fn expected(&self) -> Vec<Option<f64>> {
        match self {
            Scene::SectionA5 => vec![Some(0.0), Some(1.0), None],
            Scene::SquareCentralCell => (0..9)
                .map(|cell| Some(if cell == 4 { 1.0 } else { 0.0 }))
                .collect(),
            Scene::SquareCorners => (0..9)
                .map(|cell| Some(if matches!(cell, 0 | 2 | 6 | 8) { 1.0 } else { 0.0 }))
                .collect(),
        }
    }
}

/// One ray through a 1D chain of three cells (stored as a 1x1x3 grid).
pub fn section_a5(mode: Mode) -> RayTask {
    RayTask {
        grid_sizes: vec![1, 1, 3],
        rays: vec![vec![0, 1, 2]],
        ray_costs_occ: vec![vec![-2.0, -3.0, -2.0]],
        ray_costs_free: vec![0.0],
        nonconvex: mode.is_nonconvex(),
    }
}

/// 3x3 square with an occupied center cell.
pub fn square_central_cell(mode: Mode) -> RayTask {
    square_task(mode, [0.0, -1.0, 0.0], [-1.0, 0.0, -1.0])
}

/// 3x3 square with occupied corner cells.
pub fn square_corners(mode: Mode) -> RayTask {
    square_task(mode, [-1.0, 0.0, -1.0], [0.0, -1.0, 0.0])
}

/// Rays along every row and column of a `side` x `side` square, first in
/// forward direction (rows, then columns), then reversed.
pub fn square_rays(side: usize) -> Vec<Vec<usize>> {
    let Ok(square) = GridShape::new(vec![side, side]) else {
        return Vec::new();
    };
    let line = |fixed: usize, along_rows: bool| -> Vec<usize> {
        (0..side)
            .filter_map(|i| {
                let coords = if along_rows { [fixed, i] } else { [i, fixed] };
                square.flat_index(&coords)
            })
            .collect()
    };
    let rows: Vec<Vec<usize>> = (0..side).map(|r| line(r, true)).collect();
    let cols: Vec<Vec<usize>> = (0..side).map(|c| line(c, false)).collect();

    let mut rays = Vec::with_capacity(4 * side);
    rays.extend(rows.iter().cloned());
    rays.extend(cols.iter().cloned());
    rays.extend(rows.iter().map(|ray| ray.iter().rev().copied().collect::<Vec<_>>()));
    rays.extend(cols.iter().map(|ray| ray.iter().rev().copied().collect::<Vec<_>>()));
    rays
}

/// Build a 1x3x3 task where the i-th line of each ray family gets occupancy
/// cost `line_occ[i]` at every position and free cost `line_free[i]`.
fn square_task(mode: Mode, line_occ: [f64; 3], line_free: [f64; 3]) -> RayTask {
    let rays = square_rays(3);
    let ray_costs_occ = rays
        .iter()
        .enumerate()
        .map(|(i, ray)| vec![line_occ[i % 3]; ray.len()])
        .collect();
    let ray_costs_free = (0..rays.len()).map(|i| line_free[i % 3]).collect();

    RayTask {
        grid_sizes: vec![1, 3, 3],
        rays,
        ray_costs_occ,
        ray_costs_free,
        nonconvex: mode.is_nonconvex(),
    }
}
