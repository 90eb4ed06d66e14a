//! Jacobi fixed-point iteration.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{JacobiError, Result};
use crate::system::{validate, LinearSystem, Precision};

use super::condition::{condition, ConditioningResult};
use super::dominance::{contraction_norm, is_contraction};
use super::progress::{CancelToken, NoProgress, ProgressEvent, ProgressObserver};
use super::SolverConfig;

/// Result of a converged solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationResult {
    /// Approximations in order, starting with the seed `b`.
    ///
    /// The approximation that triggered convergence is not included, so
    /// `steps.len() == iterations` and the last step equals `solution`.
    pub steps: Vec<Vec<f64>>,
    /// Final approximation.
    pub solution: Vec<f64>,
    /// `|x_new[i] - x_old[i]|` for the last iteration.
    pub precision_vector: Vec<f64>,
    /// Number of iterations performed (1-based).
    pub iterations: usize,
    /// Contraction norm of the matrix that was iterated.
    pub norm: f64,
    /// `unknown_order[k]` is the original index of `solution[k]`.
    pub unknown_order: Vec<usize>,
}

impl IterationResult {
    /// The solution with column swaps undone.
    pub fn solution_in_original_order(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.solution.len()];
        for (k, &original) in self.unknown_order.iter().enumerate() {
            out[original] = self.solution[k];
        }
        out
    }

    /// Infinity norm of the final precision vector.
    pub fn max_difference(&self) -> f64 {
        self.precision_vector.iter().fold(0.0f64, |m, d| m.max(*d))
    }
}

/// Stage of the most recent solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    /// No solve has run yet
    Idle,
    Validating,
    Conditioning,
    Iterating,
    Converged,
    Failed,
}

/// A system ready for iteration.
struct Prepared<'a> {
    system: Cow<'a, LinearSystem>,
    norm: f64,
    unknown_order: Vec<usize>,
}

/// Jacobi solver with optional cooperative cancellation.
#[derive(Debug)]
pub struct JacobiSolver {
    config: SolverConfig,
    cancel: Option<CancelToken>,
    state: SolveState,
}

impl Default for JacobiSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl JacobiSolver {
    /// Create a solver with default configuration.
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    /// Create a solver with custom configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            cancel: None,
            state: SolveState::Idle,
        }
    }

    /// Check `token` once per iteration and abort when it is cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Stage reached by the most recent solve.
    pub fn state(&self) -> SolveState {
        self.state
    }

    /// Validate a raw request and solve it.
    pub fn solve(
        &mut self,
        matrix: Vec<Vec<f64>>,
        precision: f64,
        observer: &mut dyn ProgressObserver,
    ) -> Result<IterationResult> {
        self.transition(SolveState::Validating);
        match validate(matrix, precision) {
            Ok((system, precision)) => self.solve_system(&system, precision, observer),
            Err(err) => {
                self.transition(SolveState::Failed);
                Err(err)
            }
        }
    }

    /// Solve an already validated system.
    ///
    /// `system` is never modified; conditioning works on a copy.
    pub fn solve_system(
        &mut self,
        system: &LinearSystem,
        precision: Precision,
        observer: &mut dyn ProgressObserver,
    ) -> Result<IterationResult> {
        let outcome = self
            .prepare(system)
            .and_then(|prepared| self.iterate(prepared, precision, observer));

        match &outcome {
            Ok(result) => {
                self.transition(SolveState::Converged);
                info!(
                    iterations = result.iterations,
                    norm = result.norm,
                    "converged"
                );
            }
            Err(err) => {
                self.transition(SolveState::Failed);
                debug!(%err, "solve failed");
            }
        }
        outcome
    }

    fn transition(&mut self, state: SolveState) {
        debug!(from = ?self.state, to = ?state, "solver state");
        self.state = state;
    }

    /// Make sure the system is a contraction, conditioning it when needed.
    fn prepare<'a>(&mut self, system: &'a LinearSystem) -> Result<Prepared<'a>> {
        let failure = match contraction_norm(system) {
            Ok(norm) if is_contraction(norm) => {
                return Ok(Prepared {
                    system: Cow::Borrowed(system),
                    norm,
                    unknown_order: (0..system.size()).collect(),
                });
            }
            Ok(norm) => JacobiError::NotDiagonallyDominant { norm: Some(norm) },
            Err(err) => err,
        };

        self.transition(SolveState::Conditioning);
        match condition(system) {
            ConditioningResult {
                system,
                success: true,
                norm: Some(norm),
                column_order,
            } => Ok(Prepared {
                system: Cow::Owned(system),
                norm,
                unknown_order: column_order,
            }),
            _ => Err(failure),
        }
    }

    fn iterate(
        &mut self,
        prepared: Prepared<'_>,
        precision: Precision,
        observer: &mut dyn ProgressObserver,
    ) -> Result<IterationResult> {
        self.transition(SolveState::Iterating);

        let system = &*prepared.system;
        let norm = prepared.norm;
        let n = system.size();
        let threshold = precision.value();

        let mut x_old = system.rhs();
        let mut x_new = vec![0.0; n];
        let mut precision_vector = vec![0.0; n];
        let mut steps = vec![x_old.clone()];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(JacobiError::Cancelled { iterations });
            }

            for i in 0..n {
                let row = system.coefficients(i);
                let diag_inverse = 1.0 / row[i];
                let mut sum = system.b(i);
                for (j, a) in row.iter().enumerate() {
                    if j != i {
                        sum -= a * x_old[j];
                    }
                }
                x_new[i] = sum * diag_inverse;
            }

            for i in 0..n {
                precision_vector[i] = (x_new[i] - x_old[i]).abs();
            }

            iterations += 1;
            // NaN differences never count as converged
            if precision_vector.iter().all(|d| *d <= threshold) {
                converged = true;
                break;
            }

            steps.push(x_new.clone());
            std::mem::swap(&mut x_old, &mut x_new);

            let interval = self.config.progress_interval;
            if interval > 0 && iterations % interval == 0 {
                observer.on_progress(ProgressEvent { iterations, norm });
            }
        }

        if !converged {
            let difference = precision_vector.iter().fold(0.0f64, |m, d| m.max(*d));
            return Err(JacobiError::too_many_iterations(iterations, difference));
        }

        Ok(IterationResult {
            steps,
            solution: x_old,
            precision_vector,
            iterations,
            norm,
            unknown_order: prepared.unknown_order,
        })
    }
}

/// Solve a raw request with default configuration and no progress reporting.
pub fn solve(matrix: Vec<Vec<f64>>, precision: f64) -> Result<IterationResult> {
    JacobiSolver::new().solve(matrix, precision, &mut NoProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn fixture() -> Vec<Vec<f64>> {
        vec![vec![4.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]]
    }

    /// Slowly converging system: the iteration matrix has eigenvalues ±0.99.
    fn slow_fixture() -> Vec<Vec<f64>> {
        vec![vec![1.0, 0.99, 1.0], vec![0.99, 1.0, 1.0]]
    }

    #[test]
    fn test_two_by_two_fixed_point() {
        let result = solve(fixture(), 1e-4).unwrap();
        assert_abs_diff_eq!(result.solution[0], 1.0 / 11.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.solution[1], 18.0 / 11.0, epsilon = 1e-3);
        assert_eq!(result.iterations, 10);
        assert_relative_eq!(result.norm, 1.0 / 3.0);
        assert!(result.max_difference() <= 1e-4);
        assert_eq!(result.unknown_order, vec![0, 1]);
    }

    #[test]
    fn test_steps_layout() {
        let result = solve(fixture(), 1e-4).unwrap();
        assert_eq!(result.steps.len(), result.iterations);
        assert_eq!(result.steps[0], vec![2.0, 5.0]);
        assert_eq!(result.steps[1], vec![-0.75, 1.0]);
        assert_eq!(result.steps.last(), Some(&result.solution));
    }

    #[test]
    fn test_convergence_on_first_iteration() {
        let result = solve(fixture(), 10.0).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.steps, vec![vec![2.0, 5.0]]);
        assert_eq!(result.solution, vec![2.0, 5.0]);
        assert_eq!(result.precision_vector, vec![2.75, 4.0]);
    }

    #[test]
    fn test_repeat_solves_are_identical() {
        let first = solve(slow_fixture(), 1e-8).unwrap();
        let second = solve(slow_fixture(), 1e-8).unwrap();
        assert_eq!(first.iterations, second.iterations);
        assert_eq!(first.solution, second.solution);
        assert_eq!(first.steps, second.steps);
    }

    #[test]
    fn test_progress_cadence() {
        let mut events = Vec::new();
        let mut observer = |event: ProgressEvent| events.push(event);
        let result = JacobiSolver::new()
            .solve(slow_fixture(), 1e-6, &mut observer)
            .unwrap();

        assert!(result.iterations > 1000);
        assert_eq!(events.len(), (result.iterations - 1) / 100);
        for (k, event) in events.iter().enumerate() {
            assert_eq!(event.iterations, (k + 1) * 100);
            assert_relative_eq!(event.norm, 0.99);
        }
    }

    #[test]
    fn test_progress_disabled() {
        let mut count = 0;
        let mut observer = |_: ProgressEvent| count += 1;
        let config = SolverConfig::new().with_progress_interval(0);
        JacobiSolver::with_config(config)
            .solve(slow_fixture(), 1e-6, &mut observer)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_iteration_cap() {
        let config = SolverConfig::new().with_max_iterations(5);
        let mut solver = JacobiSolver::with_config(config);
        let err = solver
            .solve(slow_fixture(), 1e-12, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            JacobiError::TooManyIterations { iterations: 5, .. }
        ));
        assert_eq!(solver.state(), SolveState::Failed);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            solve(vec![vec![1.0, 2.0]], 0.1),
            Err(JacobiError::InvalidSize { rows: 1 })
        ));
        assert!(matches!(
            solve(fixture(), 0.0),
            Err(JacobiError::InvalidPrecision { .. })
        ));
    }

    #[test]
    fn test_conditioning_applied() {
        // Rows are out of order; swapping them gives 4x + y = 5, x + 2y = 3.
        let result = solve(vec![vec![1.0, 2.0, 3.0], vec![4.0, 1.0, 5.0]], 1e-6).unwrap();
        assert_relative_eq!(result.norm, 0.5);
        assert_abs_diff_eq!(result.solution[0], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(result.solution[1], 1.0, epsilon = 1e-5);
        assert_eq!(result.steps[0], vec![5.0, 3.0]);
    }

    #[test]
    fn test_not_dominant() {
        let mut solver = JacobiSolver::new();
        let err = solver
            .solve(vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]], 1e-4, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, JacobiError::NotDiagonallyDominant { .. }));
        assert_eq!(solver.state(), SolveState::Failed);
    }

    #[test]
    fn test_unfixable_zero_diagonal() {
        let err = solve(vec![vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 2.0]], 1e-4).unwrap_err();
        assert!(matches!(err, JacobiError::SingularDiagonal { row: 0 }));
    }

    #[test]
    fn test_solve_system_leaves_input_untouched() {
        let system =
            LinearSystem::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 1.0, 5.0]]).unwrap();
        let copy = system.clone();
        let mut solver = JacobiSolver::new();
        solver
            .solve_system(&system, Precision::new(1e-4).unwrap(), &mut NoProgress)
            .unwrap();
        assert_eq!(system, copy);
        assert_eq!(solver.state(), SolveState::Converged);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let mut solver = JacobiSolver::new().with_cancel_token(token);
        let err = solver.solve(fixture(), 1e-4, &mut NoProgress).unwrap_err();
        assert!(matches!(err, JacobiError::Cancelled { iterations: 0 }));
    }

    #[test]
    fn test_cancelled_from_observer() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut observer = move |event: ProgressEvent| {
            if event.iterations == 200 {
                trigger.cancel();
            }
        };
        let mut solver = JacobiSolver::new().with_cancel_token(token);
        let err = solver
            .solve(slow_fixture(), 1e-6, &mut observer)
            .unwrap_err();
        assert!(matches!(err, JacobiError::Cancelled { iterations: 200 }));
    }

    #[test]
    fn test_original_order_helper() {
        let result = IterationResult {
            steps: vec![],
            solution: vec![1.0, 2.0, 3.0],
            precision_vector: vec![0.0; 3],
            iterations: 1,
            norm: 0.5,
            unknown_order: vec![2, 0, 1],
        };
        assert_eq!(result.solution_in_original_order(), vec![2.0, 3.0, 1.0]);
    }
}
