//! Row/column pivoting towards diagonal dominance.
//!
//! Jacobi iteration only converges reliably when the contraction norm is
//! below one. When a system fails that test, [`condition`] tries to reorder
//! it greedily, one diagonal position at a time:
//!
//! 1. keep row `i` if its diagonal already dominates the row;
//! 2. otherwise swap in a later row whose column-`i` entry dominates it;
//! 3. otherwise swap in a later column whose row-`i` entry dominates that
//!    column's remaining entries.
//!
//! The reordered matrix is accepted only if its recomputed norm is below one.
//! Column swaps reorder the unknowns; the permutation is reported in
//! [`ConditioningResult::column_order`] but never undone.

use tracing::{debug, warn};

use crate::system::LinearSystem;

use super::dominance::{contraction_norm, is_contraction, is_row_dominant, off_diagonal_sum};

/// Outcome of a conditioning attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditioningResult {
    /// The reordered system, or the untouched input when `success` is false
    pub system: LinearSystem,
    /// Whether the returned system has a contraction norm below one
    pub success: bool,
    /// Norm of the reordered system when it could be computed
    pub norm: Option<f64>,
    /// `column_order[k]` is the original index of the unknown now in position `k`
    pub column_order: Vec<usize>,
}

impl ConditioningResult {
    fn failed(original: &LinearSystem, norm: Option<f64>) -> Self {
        Self {
            system: original.clone(),
            success: false,
            norm,
            column_order: (0..original.size()).collect(),
        }
    }
}

/// Sum of `|A[k][col]|` over all rows `k != skip`.
fn column_sum(system: &LinearSystem, col: usize, skip: usize) -> f64 {
    (0..system.size())
        .filter(|&k| k != skip)
        .map(|k| system.a(k, col).abs())
        .sum()
}

/// Try to reorder `system` into a diagonally dominant one.
///
/// The input is never modified. On failure the returned system is an exact
/// copy of it.
pub fn condition(system: &LinearSystem) -> ConditioningResult {
    let n = system.size();
    let mut work = system.clone();
    let mut column_order: Vec<usize> = (0..n).collect();

    for i in 0..n {
        if is_row_dominant(&work, i) {
            continue;
        }

        let row = (i + 1..n).find(|&j| work.a(j, i).abs() > off_diagonal_sum(&work, j, i));
        if let Some(j) = row {
            debug!(row = i, with = j, "swapping rows");
            work.swap_rows(i, j);
            continue;
        }

        let col = (i + 1..n).find(|&j| work.a(i, j).abs() > column_sum(&work, j, i));
        if let Some(j) = col {
            debug!(column = i, with = j, "swapping columns");
            work.swap_columns(i, j);
            column_order.swap(i, j);
            continue;
        }

        warn!(row = i, "no row or column swap makes this row dominant");
        return ConditioningResult::failed(system, None);
    }

    // Per-row fixes are local; only the whole-matrix norm decides.
    match contraction_norm(&work) {
        Ok(norm) if is_contraction(norm) => ConditioningResult {
            system: work,
            success: true,
            norm: Some(norm),
            column_order,
        },
        Ok(norm) => {
            warn!(norm, "reordered matrix is still not a contraction");
            ConditioningResult::failed(system, Some(norm))
        }
        Err(err) => {
            warn!(%err, "reordered matrix has a zero diagonal");
            ConditioningResult::failed(system, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn system(rows: Vec<Vec<f64>>) -> LinearSystem {
        LinearSystem::from_rows(rows).unwrap()
    }

    #[test]
    fn test_dominant_system_untouched() {
        let s = system(vec![vec![4.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]]);
        let result = condition(&s);
        assert!(result.success);
        assert_eq!(result.system, s);
        assert_eq!(result.column_order, vec![0, 1]);
    }

    #[test]
    fn test_row_swap_fixes_system() {
        let s = system(vec![vec![1.0, 2.0, 3.0], vec![4.0, 1.0, 5.0]]);
        let result = condition(&s);
        assert!(result.success);
        assert_eq!(result.system.rows(), &[vec![4.0, 1.0, 5.0], vec![1.0, 2.0, 3.0]]);
        assert_relative_eq!(result.norm.unwrap(), 0.5);
        assert_eq!(result.column_order, vec![0, 1]);
    }

    #[test]
    fn test_rhs_follows_row_swaps() {
        let s = system(vec![
            vec![1.0, 1.0, 4.0, 1.0],
            vec![5.0, 1.0, 1.0, 2.0],
            vec![1.0, 4.0, 1.0, 3.0],
        ]);
        let result = condition(&s);
        assert!(result.success);
        assert_eq!(
            result.system.rows(),
            &[
                vec![5.0, 1.0, 1.0, 2.0],
                vec![1.0, 4.0, 1.0, 3.0],
                vec![1.0, 1.0, 4.0, 1.0],
            ]
        );
        assert_relative_eq!(result.norm.unwrap(), 0.5);
    }

    #[test]
    fn test_unfixable_system_returned_unchanged() {
        let s = system(vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]]);
        let result = condition(&s);
        assert!(!result.success);
        assert_eq!(result.system, s);
        assert_eq!(result.column_order, vec![0, 1]);
    }

    #[test]
    fn test_column_swap_rolled_back_on_failure() {
        // Row 0 is fixed by swapping columns 0 and 1, then row 1 has no remedy.
        let s = system(vec![vec![1.0, 5.0, 7.0], vec![1.0, 3.0, 3.0]]);
        let result = condition(&s);
        assert!(!result.success);
        assert_eq!(result.system, s);
        assert_eq!(result.column_order, vec![0, 1]);
    }

    #[test]
    fn test_zero_diagonal_can_be_pivoted_away() {
        let s = system(vec![vec![0.0, 1.0, 1.0], vec![3.0, 1.0, 2.0]]);
        let result = condition(&s);
        assert!(result.success);
        assert_eq!(result.system.rows(), &[vec![3.0, 1.0, 2.0], vec![0.0, 1.0, 1.0]]);
        assert_relative_eq!(result.norm.unwrap(), 1.0 / 3.0);
    }
}
