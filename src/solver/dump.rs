//! Human-readable state dump for debugging.

use std::fmt;

use super::RayOptimizer;

/// Displays all primal and dual arrays of an optimizer.
///
/// Per-ray arrays are printed one ray per line. The format is meant for
/// reading, not parsing.
pub struct StateDump<'a> {
    optimizer: &'a RayOptimizer,
}

impl<'a> StateDump<'a> {
    pub(crate) fn new(optimizer: &'a RayOptimizer) -> Self {
        Self { optimizer }
    }
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    write!(f, "[")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:.4}", v)?;
    }
    write!(f, "]")
}

impl StateDump<'_> {
    fn write_rays(&self, f: &mut fmt::Formatter<'_>, name: &str, values: &[f64]) -> fmt::Result {
        writeln!(f, "{}:", name)?;
        for (ray, slice) in self.optimizer.topology().split(values).into_iter().enumerate() {
            write!(f, "  ray {}: ", ray)?;
            write_values(f, slice)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for StateDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let primal = self.optimizer.primal();
        self.write_rays(f, "y_occ", &primal.y_occ)?;
        self.write_rays(f, "y_free", &primal.y_free)?;
        write!(f, "x_occ:\n  ")?;
        write_values(f, &primal.x_occ)?;
        writeln!(f)?;

        let duals = self.optimizer.duals();
        for (name, values) in duals.coupling().families() {
            self.write_rays(f, name, values)?;
        }
        if let Some(vis_con) = duals.visibility() {
            self.write_rays(f, "dual_vis_con", vis_con)?;
        }
        Ok(())
    }
}
