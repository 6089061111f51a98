// src/simulation/mod.rs

//! Runs circuits and turns the resulting state trajectory into a [`Timeline`].
//!
//! [`Simulator`] is the entry point. It owns only its [`SimulatorConfig`], so a
//! single instance can be shared across threads and reused for any number of
//! runs. Internally the `EvolutionEngine` produces one [`StateVector`] per
//! gate and [`timeline::assemble`] extracts the observables of each.

pub(crate) mod engine;
mod config;
mod results;
pub mod timeline;

pub use config::SimulatorConfig;
pub use results::{StepSnapshot, SystemMetrics, Timeline};

use crate::circuits::{qasm, tokens, Circuit};
use crate::core::{BlochError, Result, StateVector};
use engine::EvolutionEngine;
use tracing::info;

/// The main simulator orchestrating circuit evolution and observable extraction.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator with a validated configuration.
    pub fn with_config(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Runs `circuit` from `|0...0⟩` and returns the full observable timeline.
    ///
    /// # Returns
    /// * `Ok(Timeline)` with `circuit.gate_count() + 1` steps.
    /// * `Err(BlochError)` on an invalid circuit, a register larger than
    ///   `max_qubits`, or a snapshot that fails validation. No partial
    ///   timeline is returned.
    #[tracing::instrument(
        skip(self, circuit),
        fields(num_qubits = circuit.num_qubits(), operations = circuit.len())
    )]
    pub fn run(&self, circuit: &Circuit) -> Result<Timeline> {
        info!("starting simulation");
        let states = self.evolve(circuit, None)?;
        let timeline = timeline::assemble(circuit.num_qubits(), &states, &self.config)?;
        info!(steps = timeline.len(), "simulation finished");
        Ok(timeline)
    }

    /// Raw state trajectory: the initial state followed by the state after
    /// each gate. `initial` defaults to `|0...0⟩`.
    pub fn evolve(&self, circuit: &Circuit, initial: Option<StateVector>) -> Result<Vec<StateVector>> {
        self.check_register(circuit)?;
        EvolutionEngine::new(self.config.norm_tolerance).evolve(circuit, initial)
    }

    /// The state after the last gate of `circuit`, from `|0...0⟩`.
    pub fn final_state(&self, circuit: &Circuit) -> Result<StateVector> {
        self.evolve(circuit, None)?
            .pop()
            .ok_or_else(|| BlochError::numeric_anomaly("evolution produced no states"))
    }

    /// Parses a gate-token string with the configured [`crate::circuits::ParseMode`]
    /// and runs it.
    pub fn run_tokens(&self, input: &str) -> Result<Timeline> {
        let circuit = tokens::parse_tokens(input, self.config.parse_mode)?;
        self.run(&circuit)
    }

    /// Interprets an OpenQASM 2.0 program and runs it. When `expected_qubits`
    /// is given the program must declare exactly that many qubits.
    pub fn run_qasm(&self, source: &str, expected_qubits: Option<usize>) -> Result<Timeline> {
        let circuit = qasm::parse_qasm(
            source,
            self.config.parse_mode,
            expected_qubits,
            Some(self.config.max_qubits),
        )?;
        self.run(&circuit)
    }

    fn check_register(&self, circuit: &Circuit) -> Result<()> {
        if circuit.num_qubits() > self.config.max_qubits {
            return Err(BlochError::invalid_circuit(format!(
                "circuit uses {} qubits, more than the configured maximum of {}",
                circuit.num_qubits(),
                self.config.max_qubits
            )));
        }
        Ok(())
    }
}
