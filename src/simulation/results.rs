// src/simulation/results.rs
use crate::core::StateVector;
use crate::observables::QubitObservables;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole-register figures for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    /// Von Neumann entropy of the full register. Zero for pure-state evolution.
    pub full_system_entropy: f64,
    /// Purity of the full register. One for pure-state evolution.
    pub full_system_purity: f64,
    /// Placeholder: always 1.0, since the simulation is ideal and noiseless.
    pub fidelity: f64,
    /// Approximate entanglement flag from purity/entropy thresholds. Not a
    /// rigorous entanglement witness.
    pub is_entangled: bool,
    /// Largest single-qubit reduced entropy of the step.
    pub max_qubit_entropy: f64,
}

/// Observables of every qubit plus system metrics at one point in the circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    /// 0 is the initial state; step `k` is the state after the k-th gate.
    pub step: usize,
    /// One entry per qubit, indexed by qubit.
    pub bloch_spheres: Vec<QubitObservables>,
    /// Whole-register metrics for this step.
    pub metrics: SystemMetrics,
}

/// Ordered per-step snapshots of a run; always `gates + 1` entries long.
///
/// Serializes as a bare JSON array of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    steps: Vec<StepSnapshot>,
    #[serde(skip)]
    num_qubits: usize,
    #[serde(skip)]
    final_state: Option<StateVector>,
}

impl Timeline {
    pub(crate) fn new(num_qubits: usize, steps: Vec<StepSnapshot>, final_state: StateVector) -> Self {
        Self {
            steps,
            num_qubits,
            final_state: Some(final_state),
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn steps(&self) -> &[StepSnapshot] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StepSnapshot> {
        self.steps.iter()
    }

    pub fn get(&self, step: usize) -> Option<&StepSnapshot> {
        self.steps.get(step)
    }

    /// The snapshot after the last gate.
    pub fn final_step(&self) -> Option<&StepSnapshot> {
        self.steps.last()
    }

    /// The pure state after the last gate. `None` only for a timeline that was
    /// deserialized rather than produced by a run.
    pub fn final_state(&self) -> Option<&StateVector> {
        self.final_state.as_ref()
    }

    pub fn into_steps(self) -> Vec<StepSnapshot> {
        self.steps
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a StepSnapshot;
    type IntoIter = std::slice::Iter<'a, StepSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Timeline ({} qubit(s), {} step(s)):", self.num_qubits, self.steps.len())?;
        for snapshot in &self.steps {
            write!(f, "  step {:>3}:", snapshot.step)?;
            for obs in &snapshot.bloch_spheres {
                write!(
                    f,
                    " q{} {} S={:.3}",
                    obs.qubit,
                    obs.bloch(),
                    obs.entropy
                )?;
            }
            if snapshot.metrics.is_entangled {
                write!(f, " [entangled]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
