// src/service/mod.rs

//! JSON request/response boundary.
//!
//! Two request shapes are accepted:
//!
//! * `{"circuit": "H X"}` runs a single-qubit token string and returns the
//!   final state with its Bloch coordinates. An empty or missing circuit
//!   runs a lone `H`.
//! * `{"qasm_code": "...", "num_qubits": 2, "qubits_to_trace_out": [1]}`
//!   interprets an OpenQASM 2.0 program and returns the whole timeline.
//!
//! The HTTP transport itself is left to the embedding application; this
//! module only maps bodies to bodies and errors to status codes.

use crate::circuits::{qasm, tokens};
use crate::core::{BlochError, Result};
use crate::density::DensityOperator;
use crate::observables::{BlochVector, SubsystemObservables};
use crate::simulation::{Simulator, StepSnapshot, Timeline};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_CIRCUIT: &str = "H";

/// An incoming simulation request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SimulationRequest {
    Qasm {
        qasm_code: String,
        #[serde(default)]
        num_qubits: Option<usize>,
        #[serde(default)]
        qubits_to_trace_out: Vec<usize>,
    },
    Tokens {
        #[serde(default)]
        circuit: String,
    },
}

/// Reply to a token-string request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleQubitResponse {
    pub statevector: String,
    pub bloch_coordinates: BlochVector,
    /// The circuit that actually ran (`"H"` when the request was empty).
    pub circuit: String,
    pub gates_applied: usize,
    pub success: bool,
}

/// Reply to a QASM request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub timeline: Vec<StepSnapshot>,
    pub num_qubits: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reduced_subsystem: Option<SubsystemObservables>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimulationResponse {
    SingleQubit(SingleQubitResponse),
    Timeline(TimelineResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub success: bool,
}

impl From<&BlochError> for ErrorResponse {
    fn from(err: &BlochError) -> Self {
        Self {
            error: err.to_string(),
            success: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Liveness reply.
pub fn health() -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        message: "Bloch path simulation service is running".to_string(),
    }
}

/// A serialized reply with the HTTP status it should be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

/// Runs one request.
pub fn handle(simulator: &Simulator, request: &SimulationRequest) -> Result<SimulationResponse> {
    match request {
        SimulationRequest::Tokens { circuit } => {
            single_qubit(simulator, circuit).map(SimulationResponse::SingleQubit)
        }
        SimulationRequest::Qasm {
            qasm_code,
            num_qubits,
            qubits_to_trace_out,
        } => timeline(simulator, qasm_code, *num_qubits, qubits_to_trace_out)
            .map(SimulationResponse::Timeline),
    }
}

fn single_qubit(simulator: &Simulator, input: &str) -> Result<SingleQubitResponse> {
    let source = if input.trim().is_empty() {
        DEFAULT_CIRCUIT
    } else {
        input
    };
    let circuit = tokens::parse_tokens(source, simulator.config().parse_mode)?;
    let timeline = simulator.run(&circuit)?;
    let state = timeline
        .final_state()
        .ok_or_else(|| BlochError::numeric_anomaly("timeline has no final state"))?;
    let bloch = final_bloch(&timeline)?;
    Ok(SingleQubitResponse {
        statevector: state.to_string(),
        bloch_coordinates: bloch,
        circuit: source.to_string(),
        gates_applied: circuit.gate_count(),
        success: true,
    })
}

fn final_bloch(timeline: &Timeline) -> Result<BlochVector> {
    timeline
        .final_step()
        .and_then(|step| step.bloch_spheres.first())
        .map(|obs| obs.bloch())
        .ok_or_else(|| BlochError::numeric_anomaly("timeline has no qubit observables"))
}

fn timeline(
    simulator: &Simulator,
    source: &str,
    num_qubits: Option<usize>,
    trace_out: &[usize],
) -> Result<TimelineResponse> {
    let circuit = qasm::parse_qasm(
        source,
        simulator.config().parse_mode,
        num_qubits,
        Some(simulator.config().max_qubits),
    )?;
    let timeline = simulator.run(&circuit)?;

    let reduced_subsystem = if trace_out.is_empty() {
        None
    } else {
        let final_state = timeline
            .final_state()
            .ok_or_else(|| BlochError::numeric_anomaly("timeline has no final state"))?;
        let rho = DensityOperator::from_state(final_state);
        Some(SubsystemObservables::after_tracing_out(&rho, trace_out)?)
    };

    Ok(TimelineResponse {
        num_qubits: timeline.num_qubits(),
        timeline: timeline.into_steps(),
        reduced_subsystem,
        success: true,
    })
}

/// Parses a JSON body, runs it on a default [`Simulator`] and returns the
/// serialized response.
pub fn handle_json(body: &str) -> Result<String> {
    handle_json_with(&Simulator::new(), body)
}

/// [`handle_json`] with a caller-supplied simulator.
pub fn handle_json_with(simulator: &Simulator, body: &str) -> Result<String> {
    let request: SimulationRequest = serde_json::from_str(body)?;
    debug!(?request, "decoded simulation request");
    let response = handle(simulator, &request)?;
    Ok(serde_json::to_string(&response)?)
}

/// Like [`handle_json_with`], but never fails: errors become an
/// [`ErrorResponse`] body with status 400 for client errors and 500 otherwise.
pub fn respond(simulator: &Simulator, body: &str) -> Reply {
    match handle_json_with(simulator, body) {
        Ok(body) => Reply { status: 200, body },
        Err(err) => {
            let status = if err.is_client_error() { 400 } else { 500 };
            warn!(status, error = %err, "simulation request failed");
            let body = serde_json::to_string(&ErrorResponse::from(&err)).unwrap_or_else(|_| {
                r#"{"error":"failed to encode error response","success":false}"#.to_string()
            });
            Reply { status, body }
        }
    }
}
