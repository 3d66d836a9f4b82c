//! WASM bindings for the ray potential optimizer.
//!
//! This module provides JavaScript-friendly bindings, e.g. for stepping the
//! optimizer interactively in a browser visualization.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmRayOptimizer } from 'ray_potentials';
//!
//! await init();
//!
//! const task = JSON.stringify({
//!   grid_sizes: [1, 1, 3],
//!   rays: [[0, 1, 2]],
//!   ray_costs_occ: [[-2.0, -3.0, -2.0]],
//!   ray_costs_free: [0.0],
//!   nonconvex: true,
//! });
//!
//! const opt = new WasmRayOptimizer(task);
//! opt.run(1000);
//! console.log(opt.solution());
//! ```

use wasm_bindgen::prelude::*;

use crate::solver::{PreconditionerKind, RayOptimizer, SolverConfig};
use crate::task;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible ray potential optimizer.
///
/// This struct wraps the native `RayOptimizer` and provides a JavaScript-friendly API.
#[wasm_bindgen]
pub struct WasmRayOptimizer {
    optimizer: RayOptimizer,
}

#[wasm_bindgen]
impl WasmRayOptimizer {
    /// Create a new optimizer from a JSON task description.
    ///
    /// # Arguments
    /// * `task_json` - The task in the JSON format accepted by the CLI
    ///
    /// # Returns
    /// A new `WasmRayOptimizer` instance or an error if the task is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(task_json: &str) -> Result<WasmRayOptimizer, JsValue> {
        Self::with_preconditioner(task_json, false)
    }

    /// Create a new optimizer, optionally with the fixed-topology
    /// preconditioner (convex tasks only).
    #[wasm_bindgen]
    pub fn with_preconditioner(task_json: &str, fixed: bool) -> Result<WasmRayOptimizer, JsValue> {
        let task = task::parse(task_json).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let kind = if fixed {
            PreconditionerKind::Fixed
        } else {
            PreconditionerKind::Dynamic
        };
        let config = SolverConfig::new().with_preconditioner(kind);

        let optimizer =
            RayOptimizer::with_config(&task, config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WasmRayOptimizer { optimizer })
    }

    /// Advance one iteration.
    #[wasm_bindgen]
    pub fn step(&mut self) {
        self.optimizer.step();
    }

    /// Advance `iterations` iterations.
    #[wasm_bindgen]
    pub fn run(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.optimizer.step();
        }
    }

    /// Current per-cell occupancy as a new Float64Array.
    #[wasm_bindgen]
    pub fn solution(&self) -> Vec<f64> {
        self.optimizer.solution_vec()
    }

    /// Number of completed iterations.
    #[wasm_bindgen(getter)]
    pub fn iterations(&self) -> usize {
        self.optimizer.iterations()
    }

    /// Human-readable dump of all primal and dual arrays.
    #[wasm_bindgen]
    pub fn dump(&self) -> String {
        self.optimizer.dump().to_string()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the default iteration budget.
#[wasm_bindgen]
pub fn default_iterations() -> usize {
    crate::DEFAULT_ITERATIONS
}
