//! Request and response messages.
//!
//! The JSON shapes are compatible with the browser worker protocol:
//!
//! ```text
//! → { "matrix": [[4, 1, 2], [1, 3, 5]], "precision": 0.0001 }
//! ← { "progress": 100, "norm": 0.33 }
//! ← { "success": true, "result": { "steps": ..., "solution": ..., ... } }
//! ← { "success": false, "error": "Precision must be a positive number" }
//!
//! → { "action": "generateMatrix", "size": 5, "min": -10, "max": 10 }
//! ← { "action": "matrixGenerated", "matrix": [[...], ...] }
//! ```

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{JacobiError, Result};
use crate::generator::{DEFAULT_MAX, DEFAULT_MIN};
use crate::solver::{IterationResult, ProgressEvent};

const GENERATE_ACTION: &str = "generateMatrix";
const GENERATED_ACTION: &str = "matrixGenerated";

/// Inbound message for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Solve `A·x = b` to the given precision
    Solve {
        matrix: Vec<Vec<f64>>,
        precision: f64,
    },
    /// Produce a random diagonally dominant system
    Generate { size: usize, min: f64, max: f64 },
}

/// Wire form of a request, before dispatch on `action`.
#[derive(Deserialize)]
struct RawRequest {
    action: Option<String>,
    matrix: Option<Vec<Vec<f64>>>,
    precision: Option<f64>,
    size: Option<usize>,
    min: Option<f64>,
    max: Option<f64>,
}

impl Request {
    /// Decode a JSON request.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawRequest =
            serde_json::from_str(text).map_err(|e| JacobiError::invalid_request(e.to_string()))?;

        match raw.action.as_deref() {
            Some(GENERATE_ACTION) => Ok(Request::Generate {
                size: raw
                    .size
                    .ok_or_else(|| JacobiError::invalid_request("missing field `size`"))?,
                min: raw.min.unwrap_or(DEFAULT_MIN),
                max: raw.max.unwrap_or(DEFAULT_MAX),
            }),
            Some(other) => Err(JacobiError::invalid_request(format!(
                "unknown action '{}'",
                other
            ))),
            None => Ok(Request::Solve {
                matrix: raw
                    .matrix
                    .ok_or_else(|| JacobiError::invalid_request("missing field `matrix`"))?,
                precision: raw
                    .precision
                    .ok_or_else(|| JacobiError::invalid_request("missing field `precision`"))?,
            }),
        }
    }
}

/// Outbound message from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Periodic notification while a solve runs
    Progress(ProgressEvent),
    /// Successful solve
    Solved(Box<IterationResult>),
    /// Terminal failure of the current request
    Failed { error: String },
    /// Generated system
    Generated { matrix: Vec<Vec<f64>> },
}

impl Response {
    /// Build a failure response from an error.
    pub fn failure(err: &JacobiError) -> Self {
        Response::Failed {
            error: err.to_string(),
        }
    }

    /// Whether this message ends its request.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Response::Progress(_))
    }

    /// Encode as a single-line JSON message.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| JacobiError::OutputError {
            message: e.to_string(),
        })
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Response::Progress(event) => {
                map.serialize_entry("progress", &event.iterations)?;
                map.serialize_entry("norm", &event.norm)?;
            }
            Response::Solved(result) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("result", result)?;
            }
            Response::Failed { error } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
            Response::Generated { matrix } => {
                map.serialize_entry("action", GENERATED_ACTION)?;
                map.serialize_entry("matrix", matrix)?;
            }
        }
        map.end()
    }
}
