//! Error types for the ray potential optimizer.
//!
//! This module provides a unified error type [`RayPotentialError`] that covers
//! all error conditions that can occur while loading a task, validating its
//! topology, and configuring the solver.
//!
//! Once an optimizer has been constructed, stepping it never fails: running
//! out of iterations before the relaxation settles is a numerical outcome,
//! not an error.

use thiserror::Error;

/// Result type alias using [`RayPotentialError`].
pub type Result<T> = std::result::Result<T, RayPotentialError>;

/// Unified error type for all ray potential operations.
#[derive(Error, Debug)]
pub enum RayPotentialError {
    // ============ Task Validation Errors ============
    /// Grid sizes, rays or cost tables do not describe a consistent problem
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// A cost is NaN or infinite
    #[error("Non-finite occupancy cost on ray {ray} at position {pos}")]
    NonFiniteCost { ray: usize, pos: usize },

    /// A free-space cost is NaN or infinite
    #[error("Non-finite free-space cost on ray {ray}")]
    NonFiniteFreeCost { ray: usize },

    // ============ Solver Errors ============
    /// Invalid solver parameter or parameter combination
    #[error("Invalid solver parameter: {message}")]
    InvalidSolverParam { message: String },

    // ============ I/O Errors ============
    /// Task description is not valid JSON for a [`RayTask`](crate::task::RayTask)
    #[error("Failed to parse task: {source}")]
    TaskParse {
        #[source]
        source: serde_json::Error,
    },

    /// Error reading a task file
    #[error("Failed to read task file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing the report
    #[error("Output error: {message}")]
    OutputError { message: String },
}

impl RayPotentialError {
    /// Create an invalid topology error
    pub fn topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Create an invalid solver parameter error
    pub fn solver_param(message: impl Into<String>) -> Self {
        Self::InvalidSolverParam {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for RayPotentialError {
    fn from(source: serde_json::Error) -> Self {
        Self::TaskParse { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_message() {
        let err = RayPotentialError::topology("ray 3 is empty");
        assert_eq!(err.to_string(), "Invalid topology: ray 3 is empty");
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<Vec<f64>>("[1.0,").unwrap_err();
        let err: RayPotentialError = json_err.into();
        assert!(matches!(err, RayPotentialError::TaskParse { .. }));
    }

    #[test]
    fn test_file_read_message_names_path() {
        let err = RayPotentialError::FileReadError {
            path: "scene.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read task file 'scene.json': no such file"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
