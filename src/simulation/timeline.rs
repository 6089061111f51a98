// src/simulation/timeline.rs

//! Turns the engine's state snapshots into per-step observables.

use super::config::SimulatorConfig;
use super::results::{StepSnapshot, SystemMetrics, Timeline};
use crate::core::{
    BlochError, Result, StateVector, ENTANGLEMENT_ENTROPY_THRESHOLD, ENTANGLEMENT_PURITY_THRESHOLD,
};
use crate::density::DensityOperator;
use crate::observables::{purity, von_neumann_entropy, QubitObservables};
use crate::validation::{
    check_density_operator, check_normalization, check_positive_semidefinite, check_purity_bounds,
};
use tracing::warn;

/// Builds a [`Timeline`] with one [`StepSnapshot`] per state, in order.
///
/// Each state is projected to ρ, reduced to every single qubit, and the
/// observables are extracted. With `config.validate_snapshots` set, a state
/// or operator that breaks its invariants aborts the whole assembly.
pub fn assemble(
    num_qubits: usize,
    states: &[StateVector],
    config: &SimulatorConfig,
) -> Result<Timeline> {
    let Some(final_state) = states.last() else {
        return Err(BlochError::invalid_circuit("no states to assemble into a timeline"));
    };
    let steps = states
        .iter()
        .enumerate()
        .map(|(step, state)| snapshot(step, num_qubits, state, config))
        .collect::<Result<Vec<_>>>()?;
    Ok(Timeline::new(num_qubits, steps, final_state.clone()))
}

fn snapshot(
    step: usize,
    num_qubits: usize,
    state: &StateVector,
    config: &SimulatorConfig,
) -> Result<StepSnapshot> {
    if state.num_qubits() != num_qubits {
        return Err(BlochError::invalid_circuit(format!(
            "step {} holds {} qubit(s), expected {}",
            step,
            state.num_qubits(),
            num_qubits
        )));
    }

    let rho = DensityOperator::from_state(state);
    if config.validate_snapshots {
        check_normalization(state, Some(config.norm_tolerance))
            .and_then(|()| check_density_operator(&rho, Some(config.hermitian_tolerance)))
            .inspect_err(|err| warn!(step, error = %err, "snapshot failed validation"))?;
    }

    let bloch_spheres = (0..num_qubits)
        .map(|q| {
            let reduced = rho.reduce_to_qubit(q)?;
            let observables = QubitObservables::from_reduced_within(q, &reduced, config.hermitian_tolerance)?;
            if config.validate_snapshots {
                check_positive_semidefinite(&reduced, Some(config.hermitian_tolerance))
                    .and_then(|()| check_purity_bounds(observables.purity, reduced.dim(), Some(config.norm_tolerance)))
                    .inspect_err(|err| warn!(step, qubit = q, error = %err, "reduced operator failed validation"))?;
            }
            Ok(observables)
        })
        .collect::<Result<Vec<_>>>()?;

    let metrics = system_metrics(num_qubits, &rho, &bloch_spheres);
    Ok(StepSnapshot {
        step,
        bloch_spheres,
        metrics,
    })
}

fn shows_entanglement(purity: f64, entropy: f64) -> bool {
    purity < ENTANGLEMENT_PURITY_THRESHOLD && entropy > ENTANGLEMENT_ENTROPY_THRESHOLD
}

/// The heuristic fires on the full register, or on any single-qubit reduction.
/// For pure global states only the second path can fire.
fn system_metrics(num_qubits: usize, rho: &DensityOperator, qubits: &[QubitObservables]) -> SystemMetrics {
    let full_system_purity = purity(rho);
    let full_system_entropy = von_neumann_entropy(rho);
    let is_entangled = num_qubits > 1
        && (shows_entanglement(full_system_purity, full_system_entropy)
            || qubits.iter().any(|q| shows_entanglement(q.purity, q.entropy)));
    let max_qubit_entropy = qubits.iter().map(|q| q.entropy).fold(0.0, f64::max);

    SystemMetrics {
        full_system_entropy,
        full_system_purity,
        fidelity: 1.0,
        is_entangled,
        max_qubit_entropy,
    }
}
