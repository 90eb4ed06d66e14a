//! Error types for the Jacobi solver.
//!
//! This module provides a unified error type [`JacobiError`] that covers
//! all error conditions that can occur during input parsing, validation,
//! conditioning, iteration and request handling.

use thiserror::Error;

/// Result type alias using [`JacobiError`].
pub type Result<T> = std::result::Result<T, JacobiError>;

/// Unified error type for all Jacobi operations.
#[derive(Error, Debug)]
pub enum JacobiError {
    // ============ Validation Errors ============
    /// System has fewer than two rows
    #[error("The matrix must be at least two rows (got {rows})")]
    InvalidSize { rows: usize },

    /// System is larger than the engine accepts
    #[error("The matrix size {size} exceeds the maximum of {max}")]
    SizeTooLarge { size: usize, max: usize },

    /// Precision is not a strictly positive finite number
    #[error("Precision must be a positive number (got {precision})")]
    InvalidPrecision { precision: f64 },

    /// Row does not hold `n + 1` entries
    #[error("Row {row} has {actual} entries, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Entry is NaN or infinite
    #[error("Entry at row {row}, column {column} is not a finite number")]
    NonFinite { row: usize, column: usize },

    // ============ Numeric Errors ============
    /// Zero on the main diagonal
    #[error("Diagonal entry of row {row} is zero")]
    SingularDiagonal { row: usize },

    /// Conditioning could not make the matrix dominant
    #[error("The matrix is not diagonally dominant and cannot be made so by row/column swaps{}", describe_norm(.norm))]
    NotDiagonallyDominant { norm: Option<f64> },

    /// Iteration cap reached without convergence
    #[error("Too many iterations: no convergence after {iterations} iterations (last difference: {difference:.2e})")]
    TooManyIterations { iterations: usize, difference: f64 },

    /// Solve aborted through its cancel token
    #[error("Calculation cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },

    /// Generator bounds are unusable
    #[error("Wrong matrix values provided: min {min}, max {max}")]
    InvalidRange { min: f64, max: f64 },

    // ============ Input Errors ============
    /// Error while parsing the text format
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// Request message could not be decoded
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ============ I/O Errors ============
    /// Error reading a system file
    #[error("Failed to read matrix file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing results
    #[error("Output error: {message}")]
    OutputError { message: String },

    /// Request failed on the worker thread
    #[error("{message}")]
    WorkerFailure { message: String },

    /// Unexpected failure inside the worker
    #[error("Internal error: {message}")]
    Internal { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

fn describe_norm(norm: &Option<f64>) -> String {
    match norm {
        Some(norm) => format!(" (norm {norm:.4})"),
        None => String::new(),
    }
}

impl JacobiError {
    /// Create a malformed input error
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an iteration cap error
    pub fn too_many_iterations(iterations: usize, difference: f64) -> Self {
        Self::TooManyIterations {
            iterations,
            difference,
        }
    }
}
