//! Core types for system representation.

use std::fmt;

use crate::error::{JacobiError, Result};

/// Convergence threshold on the infinity norm of successive iterate differences.
///
/// Always strictly positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Precision(f64);

impl Precision {
    /// Create a precision, rejecting zero, negative and non-finite values.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(JacobiError::InvalidPrecision { precision: value })
        }
    }

    /// The raw threshold.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A square linear system in augmented-row form.
///
/// Row `i` holds `A[i][0..n]` followed by `b[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    rows: Vec<Vec<f64>>,
}

impl LinearSystem {
    /// Build a system from augmented rows.
    ///
    /// Fails with [`JacobiError::InvalidSize`] for fewer than two rows,
    /// [`JacobiError::RowLength`] when a row is not `n + 1` long and
    /// [`JacobiError::NonFinite`] for NaN or infinite entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        if n < 2 {
            return Err(JacobiError::InvalidSize { rows: n });
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != n + 1 {
                return Err(JacobiError::RowLength {
                    row: i,
                    expected: n + 1,
                    actual: row.len(),
                });
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(JacobiError::NonFinite { row: i, column: j });
            }
        }

        Ok(Self { rows })
    }

    /// Order of the system (number of unknowns).
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Coefficient `A[row][col]`.
    pub fn a(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    /// Right-hand side entry `b[row]`.
    pub fn b(&self, row: usize) -> f64 {
        self.rows[row][self.size()]
    }

    /// Coefficients of one row, without the right-hand side.
    pub fn coefficients(&self, row: usize) -> &[f64] {
        &self.rows[row][..self.size()]
    }

    /// The right-hand side as a vector.
    pub fn rhs(&self) -> Vec<f64> {
        (0..self.size()).map(|i| self.b(i)).collect()
    }

    /// Augmented rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Consume the system, returning its augmented rows.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    /// Swap two equations. The right-hand side travels with its row.
    pub(crate) fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    /// Swap two coefficient columns across every row.
    pub(crate) fn swap_columns(&mut self, i: usize, j: usize) {
        debug_assert!(i < self.size() && j < self.size(), "cannot swap the rhs column");
        for row in &mut self.rows {
            row.swap(i, j);
        }
    }
}
