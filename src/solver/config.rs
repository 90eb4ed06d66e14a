//! Solver configuration.

use super::{MAX_ITERATIONS, PROGRESS_INTERVAL};

/// Configuration for the Jacobi solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Iteration cap before giving up with `TooManyIterations`.
    pub max_iterations: usize,
    /// Emit a progress event every this many iterations (0 disables events).
    pub progress_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the progress cadence.
    ///
    /// Lower values give a smoother progress display at the cost of more
    /// observer calls; `0` silences progress entirely.
    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }
}
