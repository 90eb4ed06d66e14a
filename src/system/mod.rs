//! Linear system representation and validation.
//!
//! A system `A·x = b` of order `n` is stored as `n` rows of `n + 1` numbers:
//! the coefficients of `A` in columns `0..n` and the right-hand side `b` in
//! column `n`. The [`LinearSystem`] type guarantees that shape once built,
//! and [`validate`] performs the full precondition check a solve request
//! goes through before any numeric work.

mod types;
mod validate;

pub use types::{LinearSystem, Precision};
pub use validate::validate;
