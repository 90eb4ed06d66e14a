//! Random diagonally dominant system generator.
//!
//! Produces demo and test systems in augmented-row form. Each row gets
//! uniform off-diagonal coefficients in `[min, max]`, a diagonal of
//! `(1 + r)` times their absolute sum with `r` uniform in `[0, 0.5]`, and a
//! right-hand side uniform in `[min - span, max + span]` where
//! `span = max - min`. Every value is rounded to three decimals.

use rand::Rng;
use tracing::info;

use crate::error::{JacobiError, Result};

/// Default lower bound for generated coefficients.
pub const DEFAULT_MIN: f64 = -10.0;

/// Default upper bound for generated coefficients.
pub const DEFAULT_MAX: f64 = 10.0;

/// Largest system the generator produces.
pub const MAX_SIZE: usize = 10_000;

/// Smallest step of the three-decimal grid.
const ROUNDING_STEP: f64 = 0.001;

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Generate a `size × (size + 1)` strictly diagonally dominant system.
///
/// Off-diagonal and right-hand side values are clamped back into their
/// ranges after rounding, so bounds off the three-decimal grid may appear
/// verbatim.
pub fn generate_matrix_with<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    min: f64,
    max: f64,
) -> Result<Vec<Vec<f64>>> {
    if size == 0 {
        return Err(JacobiError::InvalidSize { rows: size });
    }
    if size > MAX_SIZE {
        return Err(JacobiError::SizeTooLarge {
            size,
            max: MAX_SIZE,
        });
    }
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(JacobiError::InvalidRange { min, max });
    }

    let span = max - min;
    let (rhs_min, rhs_max) = (min - span, max + span);
    let mut matrix = Vec::new();

    for i in 0..size {
        let mut row = Vec::new();
        let mut sum = 0.0;
        for j in 0..size {
            if i == j {
                row.push(0.0);
                continue;
            }
            let value = round3(rng.gen_range(min..=max)).clamp(min, max);
            sum += value.abs();
            row.push(value);
        }

        let r: f64 = rng.gen_range(0.0..=0.5);
        let mut diag = round3(sum * (1.0 + r));
        // Rounding (or r == 0, or an all-zero row) can erase the margin.
        if diag <= sum {
            diag = round3(sum + ROUNDING_STEP);
        }
        row[i] = diag;

        row.push(round3(rng.gen_range(rhs_min..=rhs_max)).clamp(rhs_min, rhs_max));
        matrix.push(row);
    }

    info!(size, min, max, "generated matrix");
    Ok(matrix)
}

/// Generate a system using the thread-local RNG.
pub fn generate_matrix(size: usize, min: f64, max: f64) -> Result<Vec<Vec<f64>>> {
    generate_matrix_with(&mut rand::thread_rng(), size, min, max)
}
