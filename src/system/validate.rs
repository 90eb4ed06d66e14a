//! Solve request validation.

use crate::error::{JacobiError, Result};

use super::{LinearSystem, Precision};

/// Validate a raw solve request.
///
/// Checks, in order:
/// - the system has at least two rows
/// - the precision is a positive finite number
/// - every row holds `n + 1` entries
/// - every entry is finite
pub fn validate(matrix: Vec<Vec<f64>>, precision: f64) -> Result<(LinearSystem, Precision)> {
    if matrix.len() < 2 {
        return Err(JacobiError::InvalidSize { rows: matrix.len() });
    }

    let precision = Precision::new(precision)?;
    let system = LinearSystem::from_rows(matrix)?;

    Ok((system, precision))
}
