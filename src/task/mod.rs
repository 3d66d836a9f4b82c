//! Task descriptions for the ray potential optimizer.
//!
//! A task bundles the grid shape, the rays (as flattened cell indices), the
//! per-position occupancy costs, one free-space cost per ray and the mode
//! flag. Tasks are plain data: they can be built in code, loaded from JSON
//! or taken from the built-in [`scenes`].
//!
//! # JSON Format
//!
//! ```text
//! {
//!   "grid_sizes": [1, 1, 3],
//!   "rays": [[0, 1, 2]],
//!   "ray_costs_occ": [[-2.0, -3.0, -2.0]],
//!   "ray_costs_free": [0.0],
//!   "nonconvex": true
//! }
//! ```
//!
//! `nonconvex` defaults to `false` when omitted.

pub mod scenes;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::solver::Mode;

pub use scenes::Scene;

/// Input of a ray potential optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayTask {
    /// Per-axis grid sizes
    pub grid_sizes: Vec<usize>,
    /// Flat cell indices along each ray, nearest to the viewer first
    pub rays: Vec<Vec<usize>>,
    /// Occupancy cost for every position of every ray
    pub ray_costs_occ: Vec<Vec<f64>>,
    /// Free-space cost, one per ray
    pub ray_costs_free: Vec<f64>,
    /// Enable the visibility-consistency constraint
    #[serde(default)]
    pub nonconvex: bool,
}

impl RayTask {
    /// Optimization mode selected by the `nonconvex` flag.
    pub fn mode(&self) -> Mode {
        Mode::from_nonconvex(self.nonconvex)
    }

    /// Return a copy of this task with a different mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.nonconvex = mode.is_nonconvex();
        self
    }

    /// Serialize the task to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a task from a JSON string.
pub fn parse(input: &str) -> Result<RayTask> {
    Ok(serde_json::from_str(input)?)
}

/// Parse a task file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<RayTask> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::RayPotentialError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}


#[cfg(all(test, feature = "cli"))]
mod file_tests {
    use super::*;
    use crate::error::RayPotentialError;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ray_potentials_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_file_missing_path() {
        let path = temp_path("missing.json");
        match parse_file(&path) {
            Err(RayPotentialError::FileReadError { path: reported, .. }) => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("expected FileReadError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_file_reads_written_scene() {
        let task = Scene::SquareCentralCell.build(Mode::NonConvex);
        let path = temp_path("central_cell.json");
        std::fs::write(&path, task.to_json().unwrap()).unwrap();

        let loaded = parse_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.unwrap(), task);
    }

    #[test]
    fn test_parse_file_rejects_malformed_json() {
        let path = temp_path("malformed.json");
        std::fs::write(&path, "{\"grid_sizes\": [1, 1,").unwrap();

        let loaded = parse_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(loaded, Err(RayPotentialError::TaskParse { .. })));
    }
}
