//! Grid and ray representation and validation.
//!
//! This module provides the internal representation of a task after loading.
//! The [`RayTopology`] struct holds the grid shape and all rays in a flat
//! layout suitable for the optimizer's per-position arrays, and
//! [`CostModel`] holds the matching cost tables.

mod costs;
mod topology;
mod types;
mod validate;

pub use costs::CostModel;
pub use topology::RayTopology;
pub use types::*;
pub use validate::validate_task;
