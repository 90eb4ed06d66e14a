//! WASM bindings for Jacobi Core.
//!
//! This module provides JavaScript-friendly bindings meant to run inside a
//! dedicated Web Worker, speaking the same JSON messages as the native
//! [`crate::worker`] protocol.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmJacobiWorker } from 'jacobi_core';
//!
//! await init();
//! const engine = new WasmJacobiWorker();
//!
//! addEventListener('message', ({ data }) => {
//!   const onProgress = (progress) => postMessage(JSON.parse(progress));
//!   postMessage(JSON.parse(engine.handle(JSON.stringify(data), onProgress)));
//! });
//! ```
//!
//! Cancelling a running solve is done the browser way: terminate the Web
//! Worker and start a new one.

use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::error::JacobiError;
use crate::solver::{JacobiSolver, ProgressEvent, SolverConfig};
use crate::worker::{handle_message, Response};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible request handler.
///
/// Wraps a native [`JacobiSolver`]. Each call handles one request, passing
/// progress messages to a callback as they happen and returning the
/// terminal message.
#[wasm_bindgen]
pub struct WasmJacobiWorker {
    solver: JacobiSolver,
}

impl Default for WasmJacobiWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmJacobiWorker {
    /// Create a handler with the default iteration cap and progress cadence.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmJacobiWorker {
        Self::with_config(crate::solver::MAX_ITERATIONS, crate::solver::PROGRESS_INTERVAL)
    }

    /// Create a handler with custom configuration.
    ///
    /// # Arguments
    /// * `max_iterations` - Iteration cap (default: 1000000)
    /// * `progress_interval` - Iterations between progress messages (default: 100)
    #[wasm_bindgen]
    pub fn with_config(max_iterations: usize, progress_interval: usize) -> WasmJacobiWorker {
        let config = SolverConfig::new()
            .with_max_iterations(max_iterations)
            .with_progress_interval(progress_interval);
        WasmJacobiWorker {
            solver: JacobiSolver::with_config(config),
        }
    }

    /// Handle one JSON request.
    ///
    /// # Arguments
    /// * `message` - JSON request
    /// * `on_progress` - Called with each progress message as a JSON string
    ///
    /// # Returns
    /// The terminal response message as JSON.
    #[wasm_bindgen]
    pub fn handle(&mut self, message: &str, on_progress: &Function) -> Result<String, JsValue> {
        let mut observer = |event: ProgressEvent| {
            // Progress is best effort; the terminal message reports failures.
            if let Ok(text) = Response::Progress(event).to_json() {
                let _ = on_progress.call1(&JsValue::NULL, &JsValue::from_str(&text));
            }
        };
        let terminal = handle_message(message, &mut self.solver, &mut observer);

        terminal.to_json().map_err(|e| {
            let err = JacobiError::WasmError {
                message: e.to_string(),
            };
            JsValue::from_str(&err.to_string())
        })
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
