//! Visibility-consistency branch selection.
//!
//! The non-convex constraint `y_occ[pos] <= max(0, y_free[pos - 1] + x_occ - 1)`
//! is handled piecewise. Which piece applies is decided from the sign of the
//! bracketed expression, evaluated on the live primal state at the start of
//! each pass. The primal and dual passes of one iteration each evaluate it
//! on their own, so a value at the boundary can select different branches
//! in the two passes.

/// Active piece of the visibility-consistency constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityBranch {
    /// `y_free[pos - 1] + x_occ - 1 > 0`: the linear piece binds and couples
    /// `y_occ`, the predecessor's `y_free` and `x_occ`.
    Linear,
    /// Otherwise the constraint reduces to `y_occ <= 0`.
    Zero,
}

impl VisibilityBranch {
    /// Select the branch for a predecessor `y_free` and the cell's `x_occ`.
    #[inline]
    pub fn select(y_free_prev: f64, x_occ: f64) -> Self {
        if linear_branch(y_free_prev, x_occ) > 0.0 {
            VisibilityBranch::Linear
        } else {
            VisibilityBranch::Zero
        }
    }

    /// Check if the linear piece is active.
    pub fn is_linear(&self) -> bool {
        matches!(self, VisibilityBranch::Linear)
    }
}

/// Value of the linear piece `y_free_prev + x_occ - 1`.
#[inline]
pub fn linear_branch(y_free_prev: f64, x_occ: f64) -> f64 {
    y_free_prev + x_occ - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_selection() {
        assert_eq!(VisibilityBranch::select(1.0, 0.5), VisibilityBranch::Linear);
        assert_eq!(VisibilityBranch::select(0.25, 0.5), VisibilityBranch::Zero);
        assert!(!VisibilityBranch::select(0.5, 0.25).is_linear());
    }

    #[test]
    fn test_boundary_is_zero_branch() {
        // Exactly zero does not activate the linear piece
        assert_eq!(VisibilityBranch::select(1.0, 0.0), VisibilityBranch::Zero);
        assert_eq!(VisibilityBranch::select(0.5, 0.5), VisibilityBranch::Zero);
    }
}
