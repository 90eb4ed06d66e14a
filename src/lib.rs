//! # Jacobi Core
//!
//! An iterative solver for square linear systems `A·x = b`.
//!
//! This library provides:
//! - Jacobi fixed-point iteration with a convergence threshold and an
//!   iteration cap
//! - Automatic row/column pivoting of systems that are not diagonally dominant
//! - Periodic progress events and cooperative cancellation
//! - A generator of random diagonally dominant systems
//! - A worker thread speaking a JSON request/response protocol
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`system`] - Linear system representation and validation
//! - [`solver`] - Dominance analysis, conditioning and Jacobi iteration
//! - [`generator`] - Random diagonally dominant systems
//! - [`input`] - Text file format for systems
//! - [`worker`] - Dedicated solver thread and wire protocol
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! jacobi generate --size 5 --min -10 --max 10 > system.txt
//! jacobi solve system.txt
//! ```
//!
//! ### Library
//!
//! ```
//! let result = jacobi_core::solve(vec![vec![4.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]], 1e-4).unwrap();
//! assert!((result.solution[0] - 1.0 / 11.0).abs() < 1e-3);
//! ```
//!
//! ## Convergence
//!
//! Jacobi iteration is guaranteed to converge when every diagonal entry
//! dominates the rest of its row, i.e. when
//! `max_i Σ_{j≠i} |A[i][j] / A[i][i]| < 1`. Systems failing that test are
//! reordered greedily before iterating; if no reordering is found the solve
//! fails instead of iterating on a system that may diverge.

pub mod error;
pub mod generator;
pub mod input;
pub mod solver;
pub mod system;
pub mod worker;

// Re-export main types for convenience
pub use error::{JacobiError, Result};
pub use generator::{generate_matrix, generate_matrix_with};
pub use solver::{solve, IterationResult, JacobiSolver, ProgressEvent, SolverConfig};
pub use system::{LinearSystem, Precision};
pub use worker::{Request, Response, Worker};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmJacobiWorker;

/// Default convergence threshold
pub const DEFAULT_PRECISION: f64 = 0.0001;
