//! Text output for the CLI frontend.
//!
//! Writes per-iteration state dumps and the final occupancy, laid out as
//! rows of the grid's last axis.

use std::io::Write;

use crate::error::{RayPotentialError, Result};
use crate::grid::GridShape;
use crate::solver::RayOptimizer;
use crate::task::Scene;

/// Separator printed between verbose state dumps.
pub const SEPARATOR: &str =
    "-----------------------------------------------------------------";

fn output_error(e: std::io::Error) -> RayPotentialError {
    RayPotentialError::OutputError {
        message: e.to_string(),
    }
}

/// Format per-cell entries as rows of the grid's last axis.
pub fn format_grid<F>(grid: &GridShape, mut cell: F) -> String
where
    F: FnMut(usize) -> String,
{
    let row_len = grid.row_len();
    let mut out = String::new();
    for start in (0..grid.num_cells()).step_by(row_len) {
        let row: Vec<String> = (start..start + row_len).map(&mut cell).collect();
        out.push_str("  [");
        out.push_str(&row.join(", "));
        out.push_str("]\n");
    }
    out
}

/// Write the state dump of one iteration.
pub fn write_state<W: Write>(out: &mut W, iteration: usize, optimizer: &RayOptimizer) -> Result<()> {
    writeln!(out, "step: {}", iteration).map_err(output_error)?;
    write!(out, "{}", optimizer.dump()).map_err(output_error)?;
    writeln!(out, "{}", SEPARATOR).map_err(output_error)?;
    Ok(())
}

/// Write the final occupancy, and the desired one for a built-in scene.
pub fn write_solution<W: Write>(
    out: &mut W,
    optimizer: &RayOptimizer,
    scene: Option<Scene>,
) -> Result<()> {
    let grid = optimizer.topology().grid();
    let solution = optimizer.solution();

    writeln!(
        out,
        "Final occupancy indicators ({} mode, {} iterations):",
        optimizer.mode(),
        optimizer.iterations()
    )
    .map_err(output_error)?;
    write!(out, "{}", format_grid(grid, |c| format!("{:.4}", solution[c]))).map_err(output_error)?;

    if let Some(scene) = scene {
        let expected = scene.expected();
        writeln!(out, "Desired occupancy indicators:").map_err(output_error)?;
        let desired = format_grid(grid, |c| match expected.get(c).copied().flatten() {
            Some(v) => format!("{:.4}", v),
            None => "whatever".to_string(),
        });
        write!(out, "{}", desired).map_err(output_error)?;
    }

    out.flush().map_err(output_error)
}
