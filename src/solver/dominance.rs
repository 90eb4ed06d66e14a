//! Diagonal dominance analysis.

use crate::error::{JacobiError, Result};
use crate::system::LinearSystem;

/// Sum of `|A[row][k]|` over the coefficient columns `k != skip`.
pub(crate) fn off_diagonal_sum(system: &LinearSystem, row: usize, skip: usize) -> f64 {
    system
        .coefficients(row)
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != skip)
        .map(|(_, v)| v.abs())
        .sum()
}

/// Check whether `|A[row][row]|` strictly exceeds the rest of its row.
pub fn is_row_dominant(system: &LinearSystem, row: usize) -> bool {
    system.a(row, row).abs() > off_diagonal_sum(system, row, row)
}

/// Check strict diagonal dominance of every row.
pub fn is_diagonally_dominant(system: &LinearSystem) -> bool {
    (0..system.size()).all(|i| is_row_dominant(system, i))
}

/// Compute the contraction norm `max_i Σ_{j≠i} |A[i][j] / A[i][i]|`.
///
/// Fails with [`JacobiError::SingularDiagonal`] on the first zero diagonal
/// entry instead of producing an infinite norm.
pub fn contraction_norm(system: &LinearSystem) -> Result<f64> {
    let mut norm = 0.0f64;
    for i in 0..system.size() {
        let diag = system.a(i, i);
        if diag == 0.0 {
            return Err(JacobiError::SingularDiagonal { row: i });
        }
        let row_sum: f64 = system
            .coefficients(i)
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, v)| (v / diag).abs())
            .sum();
        norm = norm.max(row_sum);
    }
    Ok(norm)
}

/// Whether a norm guarantees Jacobi convergence.
pub fn is_contraction(norm: f64) -> bool {
    norm < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn system(rows: Vec<Vec<f64>>) -> LinearSystem {
        LinearSystem::from_rows(rows).unwrap()
    }

    #[test]
    fn test_norm_of_dominant_system() {
        let s = system(vec![vec![4.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]]);
        let norm = contraction_norm(&s).unwrap();
        assert_relative_eq!(norm, 1.0 / 3.0);
        assert!(is_contraction(norm));
        assert!(is_diagonally_dominant(&s));
    }

    #[test]
    fn test_norm_uses_absolute_ratios() {
        let s = system(vec![
            vec![-5.0, 2.0, -2.0, 1.0],
            vec![1.0, 2.0, -0.5, 1.0],
            vec![0.0, 1.0, 10.0, 1.0],
        ]);
        assert_relative_eq!(contraction_norm(&s).unwrap(), 0.8);
    }

    #[test]
    fn test_rhs_ignored() {
        let s = system(vec![vec![2.0, 1.0, 1000.0], vec![1.0, 2.0, -1000.0]]);
        assert_relative_eq!(contraction_norm(&s).unwrap(), 0.5);
    }

    #[test]
    fn test_non_dominant() {
        let s = system(vec![vec![1.0, 2.0, 3.0], vec![4.0, 1.0, 5.0]]);
        let norm = contraction_norm(&s).unwrap();
        assert_relative_eq!(norm, 4.0);
        assert!(!is_contraction(norm));
        assert!(!is_row_dominant(&s, 0));
    }

    #[test]
    fn test_equal_sum_is_not_strictly_dominant() {
        let s = system(vec![vec![1.0, 1.0, 0.0], vec![1.0, 2.0, 0.0]]);
        assert!(!is_row_dominant(&s, 0));
        assert!(!is_contraction(contraction_norm(&s).unwrap()));
    }

    #[test]
    fn test_zero_diagonal() {
        let s = system(vec![vec![3.0, 1.0, 1.0], vec![1.0, 0.0, 1.0]]);
        assert!(matches!(
            contraction_norm(&s),
            Err(JacobiError::SingularDiagonal { row: 1 })
        ));
    }
}
