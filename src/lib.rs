//! # Ray Potentials
//!
//! A primal-dual optimizer for ray potentials on voxel grids.
//!
//! Given rays (ordered cells along lines of sight) with per-position
//! occupancy costs and a per-ray free-space cost, the optimizer computes a
//! relaxed occupancy value in `[0, 1]` for every grid cell.
//!
//! This library provides:
//! - Task descriptions with validation, JSON loading and example scenes
//! - Convex and non-convex (visibility-consistent) relaxations
//! - A Pock–Chambolle primal-dual solver with diagonal preconditioning
//! - Text reporting of states and solutions (CLI only)
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`task`] - Task descriptions, JSON format and built-in scenes
//! - [`grid`] - Grid shape, flattened ray topology, costs and validation
//! - [`solver`] - Primal and dual steps, preconditioning and the optimizer
//! - [`report`] - Text output (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! raypot --scene a5 --mode nonconvex --iterations 1000
//! raypot --task scene.json --mode convex --preconditioner fixed
//! ```
//!
//! ### Library
//!
//! ```
//! use ray_potentials::{task::scenes, RayOptimizer, Mode};
//!
//! let task = scenes::section_a5(Mode::NonConvex);
//! let mut optimizer = RayOptimizer::new(&task).unwrap();
//! optimizer.run();
//! let occupancy = optimizer.solution();
//! assert!(occupancy[0] < 0.01 && occupancy[1] > 0.99);
//! ```
//!
//! ## Relaxation
//!
//! The convex relaxation alone can get stuck at fractional all-0.5 solutions
//! (see [`task::Scene::SectionA5`]). Non-convex mode adds the
//! visibility-consistency constraint
//! `y_occ[pos] <= max(0, y_free[pos - 1] + x_occ - 1)`, which rules them out.
//! The output is always continuous; rounding to a binary labeling is left to
//! the caller.

pub mod error;
pub mod grid;
pub mod solver;
pub mod task;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use error::{RayPotentialError, Result};
pub use solver::{Mode, PreconditionerKind, RayOptimizer, SolverConfig};
pub use task::RayTask;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmRayOptimizer;

/// Default iteration budget of a run
pub const DEFAULT_ITERATIONS: usize = solver::DEFAULT_ITERATIONS;
