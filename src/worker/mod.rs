//! Execution host for the engine.
//!
//! A [`Worker`] owns one dedicated thread running one request at a time.
//! Requests go in through an unbounded channel; responses come back through
//! a bounded one, in the order they were produced. Progress events are sent
//! with `try_send` and silently dropped when the host falls behind, so the
//! iteration loop never blocks on them. The terminal response of a request
//! is always delivered.
//!
//! Cancelling is done by discarding the worker: [`Worker::terminate`] flags
//! the in-flight solve, which stops at its next iteration without producing
//! a result, and [`Worker::restart`] brings up a fresh thread.

mod protocol;

pub use protocol::{Request, Response};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::error::{JacobiError, Result};
use crate::generator::generate_matrix;
use crate::solver::{
    CancelToken, IterationResult, JacobiSolver, ProgressEvent, ProgressObserver, SolverConfig,
};

/// Capacity of the response channel.
pub const RESPONSE_CAPACITY: usize = 64;

/// Run one request to completion.
pub fn handle_request(
    request: Request,
    solver: &mut JacobiSolver,
    observer: &mut dyn ProgressObserver,
) -> Response {
    let outcome = match request {
        Request::Solve { matrix, precision } => solver
            .solve(matrix, precision, observer)
            .map(|result| Response::Solved(Box::new(result))),
        Request::Generate { size, min, max } => {
            generate_matrix(size, min, max).map(|matrix| Response::Generated { matrix })
        }
    };
    outcome.unwrap_or_else(|err| Response::failure(&err))
}

/// Decode a JSON request and run it.
///
/// Undecodable input yields a failure response, and so does a panic while
/// handling the request.
pub fn handle_message(
    message: &str,
    solver: &mut JacobiSolver,
    observer: &mut dyn ProgressObserver,
) -> Response {
    match Request::from_json(message) {
        Ok(request) => catch_panics(|| handle_request(request, solver, observer)),
        Err(err) => Response::failure(&err),
    }
}

/// Turn a panic inside `f` into an internal-error failure response.
fn catch_panics(f: impl FnOnce() -> Response) -> Response {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        error!(%message, "request panicked");
        Response::failure(&JacobiError::internal(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Worker thread body.
fn run(
    requests: Receiver<Request>,
    responses: SyncSender<Response>,
    config: SolverConfig,
    cancel: CancelToken,
) {
    let mut solver = JacobiSolver::with_config(config).with_cancel_token(cancel.clone());

    for request in requests {
        if cancel.is_cancelled() {
            break;
        }

        let progress = responses.clone();
        let mut observer = move |event: ProgressEvent| {
            let _ = progress.try_send(Response::Progress(event));
        };

        let response = catch_panics(|| handle_request(request, &mut solver, &mut observer));

        if cancel.is_cancelled() {
            debug!("discarding response of cancelled request");
            break;
        }
        if responses.send(response).is_err() {
            break;
        }
    }
    debug!("worker thread exiting");
}

struct Running {
    requests: Sender<Request>,
    responses: Receiver<Response>,
    cancel: CancelToken,
    thread: JoinHandle<()>,
}

impl Running {
    fn start(config: SolverConfig) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::sync_channel(RESPONSE_CAPACITY);
        let cancel = CancelToken::new();

        let thread = thread::Builder::new()
            .name("jacobi-worker".to_string())
            .spawn({
                let cancel = cancel.clone();
                move || run(request_rx, response_tx, config, cancel)
            })
            .map_err(|e| JacobiError::internal(format!("failed to spawn worker thread: {e}")))?;

        Ok(Self {
            requests: request_tx,
            responses: response_rx,
            cancel,
            thread,
        })
    }

    fn stop(self) {
        self.cancel.cancel();
        // Dropping both channel ends unblocks the thread wherever it waits.
        drop(self.requests);
        drop(self.responses);
        if self.thread.join().is_err() {
            error!("worker thread panicked outside a request");
        }
    }
}

/// Handle to a dedicated solver thread.
pub struct Worker {
    config: SolverConfig,
    running: Option<Running>,
}

impl Worker {
    /// Start a worker with the given solver configuration.
    pub fn spawn(config: SolverConfig) -> Result<Self> {
        let running = Running::start(config.clone())?;
        debug!("worker started");
        Ok(Self {
            config,
            running: Some(running),
        })
    }

    /// Whether the worker thread is available.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Queue a request. Requests run one at a time, in submission order.
    pub fn submit(&self, request: Request) -> Result<()> {
        let running = self
            .running
            .as_ref()
            .ok_or_else(|| JacobiError::internal("worker has been terminated"))?;
        running
            .requests
            .send(request)
            .map_err(|_| JacobiError::internal("worker thread has exited"))
    }

    /// Wait for the next response. `None` once the worker is gone.
    pub fn recv(&self) -> Option<Response> {
        self.running.as_ref()?.responses.recv().ok()
    }

    /// Wait for the terminal response of the current request, passing
    /// progress events to `observer` on the way.
    pub fn wait(&self, observer: &mut dyn ProgressObserver) -> Option<Response> {
        while let Some(response) = self.recv() {
            match response {
                Response::Progress(event) => observer.on_progress(event),
                terminal => return Some(terminal),
            }
        }
        None
    }

    /// Submit a solve and block until it finishes.
    ///
    /// A failure reported by the worker comes back as
    /// [`JacobiError::WorkerFailure`] carrying its message.
    pub fn solve(
        &self,
        matrix: Vec<Vec<f64>>,
        precision: f64,
        observer: &mut dyn ProgressObserver,
    ) -> Result<IterationResult> {
        self.submit(Request::Solve { matrix, precision })?;
        match self.wait(observer) {
            Some(Response::Solved(result)) => Ok(*result),
            Some(Response::Failed { error }) => Err(JacobiError::WorkerFailure { message: error }),
            Some(other) => Err(JacobiError::internal(format!(
                "unexpected worker response: {other:?}"
            ))),
            None => Err(JacobiError::internal("worker stopped without a response")),
        }
    }

    /// Abort any in-flight request and stop the thread.
    ///
    /// Undelivered responses are discarded.
    pub fn terminate(&mut self) {
        if let Some(running) = self.running.take() {
            running.stop();
            debug!("worker terminated");
        }
    }

    /// Terminate and start a fresh thread with the same configuration.
    pub fn restart(&mut self) -> Result<()> {
        self.terminate();
        self.running = Some(Running::start(self.config.clone())?);
        debug!("worker restarted");
        Ok(())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.terminate();
    }
}
