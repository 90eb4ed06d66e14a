//! Jacobi iterative solver.
//!
//! This module provides the numerical engine.
//!
//! ## Jacobi Iteration
//!
//! Each equation `i` of `A·x = b` is solved for its own unknown, using the
//! previous approximation for every other unknown:
//!
//! ```text
//! x_new[i] = (b[i] - Σ_{j≠i} A[i][j] · x_old[j]) / A[i][i]
//! ```
//!
//! The iteration is a contraction, and therefore converges from any start,
//! when the norm
//!
//! ```text
//! q = max_i Σ_{j≠i} |A[i][j] / A[i][i]|
//! ```
//!
//! is below one. A solve runs in stages:
//!
//! 1. validate the request ([`crate::system::validate`])
//! 2. compute `q` ([`contraction_norm`])
//! 3. if `q >= 1`, reorder rows/columns towards dominance ([`condition`])
//! 4. iterate from `x = b` until successive approximations differ by at most
//!    the precision in every component

mod condition;
mod config;
mod dominance;
mod jacobi;
mod progress;

pub use condition::{condition, ConditioningResult};
pub use config::SolverConfig;
pub use dominance::{contraction_norm, is_contraction, is_diagonally_dominant, is_row_dominant};
pub use jacobi::{solve, IterationResult, JacobiSolver, SolveState};
pub use progress::{CancelToken, NoProgress, ProgressEvent, ProgressObserver};

/// Hard cap on Jacobi iterations for one solve.
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Iterations between two progress events.
pub const PROGRESS_INTERVAL: usize = 100;
