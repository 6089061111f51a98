// src/simulation/engine.rs
use crate::circuits::Circuit;
use crate::core::{BlochError, Result, StateVector};
use crate::operations::{Gate, GateMatrix, Matrix2, Matrix4, Operation};
use crate::validation::check_normalization;
use num_complex::Complex64;
use num_traits::Zero;
use tracing::{debug, trace};

/// Applies circuit operations to pure states.
///
/// The engine holds no state between calls. Every gate application returns a
/// new [`StateVector`]; the input is left untouched so earlier snapshots stay
/// valid.
pub(crate) struct EvolutionEngine {
    /// Allowed deviation of ‖ψ‖² from 1 for caller-supplied initial states.
    norm_tolerance: f64,
}

impl EvolutionEngine {
    pub(crate) fn new(norm_tolerance: f64) -> Self {
        Self { norm_tolerance }
    }

    /// Runs `circuit` from `initial` (default `|0...0⟩`) and returns the
    /// initial state followed by the state after each gate, in circuit order.
    ///
    /// Measurements and barriers are skipped entirely: they neither alter the
    /// state nor contribute a snapshot.
    pub(crate) fn evolve(
        &self,
        circuit: &Circuit,
        initial: Option<StateVector>,
    ) -> Result<Vec<StateVector>> {
        circuit.validate()?;
        let n = circuit.num_qubits();

        let initial = match initial {
            Some(state) => {
                if state.num_qubits() != n {
                    return Err(BlochError::invalid_circuit(format!(
                        "initial state has {} qubit(s) but the circuit acts on {}",
                        state.num_qubits(),
                        n
                    )));
                }
                check_normalization(&state, Some(self.norm_tolerance))?;
                state
            }
            None => StateVector::zero(n)?,
        };

        let mut snapshots = Vec::with_capacity(circuit.gate_count() + 1);
        snapshots.push(initial);

        for (index, op) in circuit.operations().iter().enumerate() {
            match op {
                Operation::Gate { gate, qubits } => {
                    let current = snapshots.last().ok_or_else(|| {
                        BlochError::numeric_anomaly("evolution lost its initial snapshot")
                    })?;
                    let next = apply_gate(current, gate, qubits)?;
                    trace!(op = index, %gate, ?qubits, "applied gate");
                    snapshots.push(next);
                }
                Operation::Measure { .. } | Operation::Barrier { .. } => {
                    debug!(op = index, operation = %op, "skipping non-unitary operation");
                }
            }
        }
        Ok(snapshots)
    }
}

/// Applies one gate to `state`, returning the evolved state.
///
/// # Errors
/// `InvalidCircuit` when the target list does not fit the gate or the register.
pub(crate) fn apply_gate(state: &StateVector, gate: &Gate, qubits: &[usize]) -> Result<StateVector> {
    let n = state.num_qubits();
    if let Some(&q) = qubits.iter().find(|&&q| q >= n) {
        return Err(BlochError::invalid_circuit(format!(
            "qubit index {} out of range for {} qubits",
            q, n
        )));
    }
    let amplitudes = match (gate.matrix(), qubits) {
        (GateMatrix::Single(m), [target]) => apply_single_qubit_gate(state.amplitudes(), *target, &m),
        (GateMatrix::Two(m), [first, second]) if first != second => {
            apply_two_qubit_gate(state.amplitudes(), *first, *second, &m)
        }
        _ => {
            return Err(BlochError::invalid_circuit(format!(
                "gate '{}' cannot act on qubits {:?}",
                gate.name(),
                qubits
            )));
        }
    };
    Ok(StateVector::from_evolved(amplitudes, n))
}

/// Inserts a zero bit at position `k` of `i`, shifting the higher bits up.
fn insert_zero_bit(i: usize, k: usize) -> usize {
    let lower_mask = (1usize << k) - 1;
    ((i & !lower_mask) << 1) | (i & lower_mask)
}

/// Applies a 2x2 matrix to qubit `target` and the identity elsewhere.
fn apply_single_qubit_gate(psi: &[Complex64], target: usize, matrix: &Matrix2) -> Vec<Complex64> {
    let dim = psi.len();
    let k_mask = 1usize << target;
    let mut new_vec = vec![Complex64::zero(); dim];

    // Iterate over pairs of basis states differing only at the target bit.
    for i in 0..dim / 2 {
        let i0 = insert_zero_bit(i, target);
        let i1 = i0 | k_mask;

        let psi_0 = psi[i0];
        let psi_1 = psi[i1];

        new_vec[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
        new_vec[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
    }
    new_vec
}

/// Applies a 4x4 matrix to the ordered pair `(first, second)`.
/// Local basis index is `2 * bit(first) + bit(second)`.
fn apply_two_qubit_gate(
    psi: &[Complex64],
    first: usize,
    second: usize,
    matrix: &Matrix4,
) -> Vec<Complex64> {
    let dim = psi.len();
    let mut new_vec = vec![Complex64::zero(); dim];

    let (low, high) = (first.min(second), first.max(second));
    let first_mask = 1usize << first;
    let second_mask = 1usize << second;

    // 2^(n-2) iterations over the other qubits.
    for i_other in 0..dim / 4 {
        let i_base = insert_zero_bit(insert_zero_bit(i_other, low), high);

        let indices = [
            i_base,                             // 00
            i_base | second_mask,               // 01
            i_base | first_mask,                // 10
            i_base | first_mask | second_mask,  // 11
        ];

        let mut psi_local = [Complex64::zero(); 4];
        for (slot, &idx) in psi_local.iter_mut().zip(indices.iter()) {
            *slot = psi[idx];
        }

        for (row, &idx) in indices.iter().enumerate() {
            new_vec[idx] = (0..4).map(|col| matrix[row][col] * psi_local[col]).sum();
        }
    }
    new_vec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    /// Asserts that two complex state vectors are approximately equal component-wise.
    fn assert_complex_vec_approx_equal(
        actual: &[Complex64],
        expected: &[Complex64],
        tolerance: f64,
        context: &str,
    ) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < tolerance * tolerance,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, DistSq: {:.3e}, Context: {}",
                i, actual[i], expected[i], dist_sq, context
            );
        }
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn engine() -> EvolutionEngine {
        EvolutionEngine::new(1e-9)
    }

    #[test]
    fn test_snapshot_count_skips_measurements() -> Result<()> {
        let circuit = CircuitBuilder::new(2)
            .gate(Gate::H, 0)
            .measure(0, 0)
            .gate2(Gate::CX, 0, 1)
            .build()?;
        let states = engine().evolve(&circuit, None)?;
        assert_eq!(states.len(), 3);
        assert_eq!(states[0], StateVector::zero(2)?);
        Ok(())
    }

    #[test]
    fn test_little_endian_single_qubit() -> Result<()> {
        // X on qubit 1 of |00> gives |10>, i.e. basis index 2.
        let circuit = CircuitBuilder::new(2).gate(Gate::X, 1).build()?;
        let states = engine().evolve(&circuit, None)?;
        let zero = Complex64::zero();
        assert_complex_vec_approx_equal(
            states[1].amplitudes(),
            &[zero, zero, c(1.0, 0.0), zero],
            TEST_TOLERANCE,
            "X on qubit 1",
        );
        Ok(())
    }

    #[test]
    fn test_bell_pair() -> Result<()> {
        let circuit = CircuitBuilder::new(2).gate(Gate::H, 0).gate2(Gate::CX, 0, 1).build()?;
        let states = engine().evolve(&circuit, None)?;
        let s = c(FRAC_1_SQRT_2, 0.0);
        let zero = Complex64::zero();
        assert_complex_vec_approx_equal(
            states[2].amplitudes(),
            &[s, zero, zero, s],
            TEST_TOLERANCE,
            "(|00> + |11>)/sqrt(2)",
        );
        Ok(())
    }

    #[test]
    fn test_controlled_gate_respects_control_order() -> Result<()> {
        // Control on qubit 1, target qubit 0, starting from |10> (index 2) -> |11> (index 3).
        let start = StateVector::basis(2, 2)?;
        let flipped = apply_gate(&start, &Gate::CX, &[1, 0])?;
        assert_eq!(flipped, StateVector::basis(2, 3)?);

        // Control on qubit 0 is |0>, nothing happens.
        let unchanged = apply_gate(&start, &Gate::CX, &[0, 1])?;
        assert_eq!(unchanged, start);
        Ok(())
    }

    #[test]
    fn test_two_qubit_gate_in_larger_register() -> Result<()> {
        // |q2 q1 q0> = |001> (index 1); CX(0 -> 2) gives |101> (index 5).
        let start = StateVector::basis(3, 1)?;
        let out = apply_gate(&start, &Gate::CX, &[0, 2])?;
        assert_eq!(out, StateVector::basis(3, 5)?);

        // SWAP(0, 2) on |001> gives |100> (index 4).
        let swapped = apply_gate(&start, &Gate::Swap, &[0, 2])?;
        assert_eq!(swapped, StateVector::basis(3, 4)?);
        Ok(())
    }

    #[test]
    fn test_hadamard_is_self_inverse() -> Result<()> {
        let circuit = CircuitBuilder::new(1).gate(Gate::H, 0).gate(Gate::H, 0).build()?;
        let states = engine().evolve(&circuit, None)?;
        assert!(states[2].approx_eq(&states[0], TEST_TOLERANCE));
        Ok(())
    }

    #[test]
    fn test_input_state_is_not_mutated() -> Result<()> {
        let start = StateVector::zero(1)?;
        let before = start.clone();
        let _ = apply_gate(&start, &Gate::H, &[0])?;
        assert_eq!(start, before);
        Ok(())
    }

    #[test]
    fn test_initial_state_validation() -> Result<()> {
        let circuit = CircuitBuilder::new(2).gate(Gate::H, 0).build()?;
        let wrong_size = StateVector::zero(1)?;
        assert!(matches!(
            engine().evolve(&circuit, Some(wrong_size)),
            Err(BlochError::InvalidCircuit { .. })
        ));

        let custom = StateVector::basis(2, 3)?;
        let states = engine().evolve(&circuit, Some(custom.clone()))?;
        assert_eq!(states[0], custom);
        Ok(())
    }

    #[test]
    fn test_apply_gate_rejects_bad_targets() -> Result<()> {
        let state = StateVector::zero(2)?;
        assert!(apply_gate(&state, &Gate::H, &[2]).is_err());
        assert!(apply_gate(&state, &Gate::CX, &[1, 1]).is_err());
        assert!(apply_gate(&state, &Gate::CX, &[0]).is_err());
        Ok(())
    }
}
