//! Progress notification and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Periodic notification emitted while iterating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressEvent {
    /// Iterations completed so far
    pub iterations: usize,
    /// Contraction norm of the matrix being solved
    pub norm: f64,
}

/// Receiver of progress events.
///
/// Called synchronously from the iteration loop, so implementations must
/// return quickly and never block.
pub trait ProgressObserver {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressObserver for F {
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

/// Shared flag asking an in-flight solve to stop.
///
/// Clones observe the same flag. Once cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: ProgressEvent| seen.push(event.iterations);
            observer.on_progress(ProgressEvent {
                iterations: 100,
                norm: 0.5,
            });
        }
        assert_eq!(seen, vec![100]);
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
