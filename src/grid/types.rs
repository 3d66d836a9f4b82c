//! Core types for grid addressing.

use std::fmt;

use crate::error::{RayPotentialError, Result};

/// Shape of an n-dimensional box of cells.
///
/// Cells are addressed by a single flattened index in row-major order
/// (the last axis varies fastest). The optimizer itself only needs the
/// cell count; the per-axis sizes are used to build scenes and to print
/// solutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridShape {
    sizes: Vec<usize>,
    num_cells: usize,
}

impl GridShape {
    /// Create a grid shape from per-axis sizes.
    ///
    /// Fails if there are no axes, an axis has size zero, or the cell count
    /// overflows `usize`.
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.is_empty() {
            return Err(RayPotentialError::topology("Grid must have at least one axis"));
        }

        let mut num_cells = 1usize;
        for (axis, &size) in sizes.iter().enumerate() {
            if size == 0 {
                return Err(RayPotentialError::topology(format!(
                    "Grid axis {} has non-positive size",
                    axis
                )));
            }
            num_cells = num_cells.checked_mul(size).ok_or_else(|| {
                RayPotentialError::topology("Grid cell count overflows usize")
            })?;
        }

        Ok(Self { sizes, num_cells })
    }

    /// Per-axis sizes.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Total number of cells (product of the axis sizes).
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Check whether a flat cell index lies inside the grid.
    pub fn contains(&self, cell: usize) -> bool {
        cell < self.num_cells
    }

    /// Flatten per-axis coordinates into a cell index.
    ///
    /// Returns `None` if the number of coordinates does not match the number
    /// of axes or a coordinate is out of range.
    pub fn flat_index(&self, coords: &[usize]) -> Option<usize> {
        if coords.len() != self.sizes.len() {
            return None;
        }
        let mut index = 0usize;
        for (&c, &size) in coords.iter().zip(&self.sizes) {
            if c >= size {
                return None;
            }
            index = index * size + c;
        }
        Some(index)
    }

    /// Length of the last (fastest varying) axis.
    pub fn row_len(&self) -> usize {
        self.sizes.last().copied().unwrap_or(1)
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, size) in self.sizes.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{}", size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_cells() {
        let grid = GridShape::new(vec![1, 3, 3]).unwrap();
        assert_eq!(grid.num_cells(), 9);
        assert_eq!(grid.to_string(), "1x3x3");
    }

    #[test]
    fn test_rejects_zero_axis() {
        assert!(matches!(
            GridShape::new(vec![2, 0, 3]),
            Err(RayPotentialError::InvalidTopology { .. })
        ));
        assert!(GridShape::new(Vec::new()).is_err());
    }

    #[test]
    fn test_flat_index_row_major() {
        let grid = GridShape::new(vec![1, 3, 3]).unwrap();
        assert_eq!(grid.flat_index(&[0, 1, 2]), Some(5));
        assert_eq!(grid.flat_index(&[0, 2, 0]), Some(6));
        assert_eq!(grid.flat_index(&[0, 3, 0]), None);
        assert_eq!(grid.flat_index(&[1, 2]), None);
    }
}
