// src/density/mod.rs

//! Density operators: projection of pure states and partial-trace reduction.
//!
//! A density operator over `k` qubits is a `2^k x 2^k` complex matrix using the
//! same little-endian basis ordering as [`StateVector`]: qubit `q` is bit `q`
//! of both the row and the column index.

use crate::core::{BlochError, Result, StateVector};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use num_traits::Zero;
use std::fmt;

/// A (possibly mixed) state of `num_qubits` qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityOperator {
    matrix: DMatrix<Complex64>,
    num_qubits: usize,
}

impl DensityOperator {
    /// Projects a pure state onto its density operator, ρ = |ψ⟩⟨ψ|.
    pub fn from_state(state: &StateVector) -> Self {
        let psi = DVector::from_column_slice(state.amplitudes());
        let matrix = &psi * psi.adjoint();
        Self {
            matrix,
            num_qubits: state.num_qubits(),
        }
    }

    /// Wraps an arbitrary square matrix of dimension `2^k`, `k >= 1`.
    ///
    /// Only the shape is checked here; use
    /// [`crate::validation::check_density_operator`] to verify Hermiticity and
    /// trace.
    pub fn from_matrix(matrix: DMatrix<Complex64>) -> Result<Self> {
        let (rows, cols) = matrix.shape();
        if rows != cols || rows < 2 || !rows.is_power_of_two() {
            return Err(BlochError::shape_mismatch(
                (rows.next_power_of_two().max(2), rows.next_power_of_two().max(2)),
                (rows, cols),
            ));
        }
        Ok(Self {
            num_qubits: rows.trailing_zeros() as usize,
            matrix,
        })
    }

    /// The maximally mixed state I / 2^n.
    pub fn maximally_mixed(num_qubits: usize) -> Result<Self> {
        let dim = crate::core::state::dimension_for(num_qubits)?;
        let value = Complex64::new(1.0 / dim as f64, 0.0);
        Ok(Self {
            matrix: DMatrix::from_diagonal_element(dim, dim, value),
            num_qubits,
        })
    }

    /// Read-only access to the matrix.
    pub fn matrix(&self) -> &DMatrix<Complex64> {
        &self.matrix
    }

    /// Number of qubits described.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension (`2^num_qubits`).
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Tr(ρ). Equal to 1 for a valid density operator.
    pub fn trace(&self) -> Complex64 {
        self.matrix.trace()
    }

    /// Marginalizes out the qubits in `trace_out`.
    ///
    /// The remaining qubits keep their relative order: the lowest remaining
    /// qubit becomes qubit 0 of the result. An empty list returns a copy.
    ///
    /// # Errors
    /// `InvalidCircuit` if an index is out of range, repeated, or if every
    /// qubit would be traced out.
    pub fn partial_trace(&self, trace_out: &[usize]) -> Result<Self> {
        let n = self.num_qubits;
        let mut traced = vec![false; n];
        for &q in trace_out {
            if q >= n {
                return Err(BlochError::invalid_circuit(format!(
                    "cannot trace out qubit {} of a {}-qubit operator",
                    q, n
                )));
            }
            if std::mem::replace(&mut traced[q], true) {
                return Err(BlochError::invalid_circuit(format!(
                    "qubit {} listed twice for tracing out",
                    q
                )));
            }
        }
        if trace_out.is_empty() {
            return Ok(self.clone());
        }

        let keep: Vec<usize> = (0..n).filter(|&q| !traced[q]).collect();
        let environment: Vec<usize> = (0..n).filter(|&q| traced[q]).collect();
        if keep.is_empty() {
            return Err(BlochError::invalid_circuit(
                "cannot trace out every qubit of the operator",
            ));
        }

        let reduced_dim = 1usize << keep.len();
        let env_dim = 1usize << environment.len();
        let mut reduced = DMatrix::from_element(reduced_dim, reduced_dim, Complex64::zero());

        for r in 0..reduced_dim {
            let row_bits = scatter_bits(r, &keep);
            for c in 0..reduced_dim {
                let col_bits = scatter_bits(c, &keep);
                let mut sum = Complex64::zero();
                for e in 0..env_dim {
                    let env_bits = scatter_bits(e, &environment);
                    sum += self.matrix[(row_bits | env_bits, col_bits | env_bits)];
                }
                reduced[(r, c)] = sum;
            }
        }

        Ok(Self {
            matrix: reduced,
            num_qubits: keep.len(),
        })
    }

    /// The 2x2 reduced operator of qubit `target`, tracing out all others.
    /// For a single-qubit operator this is the operator itself.
    pub fn reduce_to_qubit(&self, target: usize) -> Result<Self> {
        if target >= self.num_qubits {
            return Err(BlochError::invalid_circuit(format!(
                "qubit index {} out of range for {} qubits",
                target, self.num_qubits
            )));
        }
        let others: Vec<usize> = (0..self.num_qubits).filter(|&q| q != target).collect();
        self.partial_trace(&others)
    }
}

/// Places bit `j` of `value` at bit position `positions[j]`.
fn scatter_bits(value: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .filter(|(j, _)| (value >> j) & 1 == 1)
        .fold(0, |acc, (_, &pos)| acc | (1usize << pos))
}

impl fmt::Display for DensityOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DensityOperator[{} qubit(s)]", self.num_qubits)?;
        for r in 0..self.dim() {
            let row: Vec<String> = (0..self.dim())
                .map(|c| {
                    let z = self.matrix[(r, c)];
                    format!("{:+.4}{:+.4}i", z.re, z.im)
                })
                .collect();
            writeln!(f, "  [{}]", row.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TOL: f64 = 1e-12;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn assert_matrix_close(actual: &DMatrix<Complex64>, expected: &DMatrix<Complex64>) {
        assert_eq!(actual.shape(), expected.shape());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).norm() < TOL, "actual {}\nexpected {}", actual, expected);
        }
    }

    fn bell_state() -> StateVector {
        let s = c(FRAC_1_SQRT_2, 0.0);
        StateVector::from_amplitudes(vec![s, Complex64::zero(), Complex64::zero(), s], None)
            .unwrap()
    }

    #[test]
    fn test_projection_of_plus_state() {
        let s = c(FRAC_1_SQRT_2, 0.0);
        let plus = StateVector::from_amplitudes(vec![s, s], None).unwrap();
        let rho = DensityOperator::from_state(&plus);
        let expected = DMatrix::from_element(2, 2, c(0.5, 0.0));
        assert_matrix_close(rho.matrix(), &expected);
        assert!((rho.trace() - c(1.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn test_projection_conjugates_the_bra() {
        // |+i> = (|0> + i|1>)/sqrt(2): rho_01 = -i/2, rho_10 = i/2.
        let plus_i =
            StateVector::from_amplitudes(vec![c(FRAC_1_SQRT_2, 0.0), c(0.0, FRAC_1_SQRT_2)], None)
                .unwrap();
        let rho = DensityOperator::from_state(&plus_i);
        assert!((rho.matrix()[(0, 1)] - c(0.0, -0.5)).norm() < TOL);
        assert!((rho.matrix()[(1, 0)] - c(0.0, 0.5)).norm() < TOL);
    }

    #[test]
    fn test_single_qubit_reduction_is_identity() -> Result<()> {
        let s = c(FRAC_1_SQRT_2, 0.0);
        let plus = StateVector::from_amplitudes(vec![s, s], None)?;
        let rho = DensityOperator::from_state(&plus);
        assert_eq!(rho.reduce_to_qubit(0)?, rho);
        assert_eq!(rho.partial_trace(&[])?, rho);
        Ok(())
    }

    #[test]
    fn test_bell_reductions_are_maximally_mixed() -> Result<()> {
        let rho = DensityOperator::from_state(&bell_state());
        let mixed = DensityOperator::maximally_mixed(1)?;
        assert_matrix_close(rho.reduce_to_qubit(0)?.matrix(), mixed.matrix());
        assert_matrix_close(rho.reduce_to_qubit(1)?.matrix(), mixed.matrix());
        Ok(())
    }

    #[test]
    fn test_product_state_reduction_follows_bit_order() -> Result<()> {
        // |q1 q0> = |10>: qubit 0 is |0>, qubit 1 is |1>.
        let rho = DensityOperator::from_state(&StateVector::basis(2, 2)?);
        let q0 = rho.reduce_to_qubit(0)?;
        let q1 = rho.reduce_to_qubit(1)?;
        assert!((q0.matrix()[(0, 0)] - c(1.0, 0.0)).norm() < TOL);
        assert!((q1.matrix()[(1, 1)] - c(1.0, 0.0)).norm() < TOL);
        Ok(())
    }

    #[test]
    fn test_partial_trace_keeps_relative_order() -> Result<()> {
        // |q2 q1 q0> = |110> (index 6). Trace out qubit 1: remaining (q2, q0) = |1,0>,
        // i.e. new qubit 0 = old q0 = 0, new qubit 1 = old q2 = 1 -> index 2.
        let rho = DensityOperator::from_state(&StateVector::basis(3, 6)?);
        let reduced = rho.partial_trace(&[1])?;
        assert_eq!(reduced.num_qubits(), 2);
        assert!((reduced.matrix()[(2, 2)] - c(1.0, 0.0)).norm() < TOL);
        assert!((reduced.trace() - c(1.0, 0.0)).norm() < TOL);
        Ok(())
    }

    #[test]
    fn test_partial_trace_errors() {
        let rho = DensityOperator::from_state(&bell_state());
        assert!(rho.partial_trace(&[2]).is_err());
        assert!(rho.partial_trace(&[0, 0]).is_err());
        assert!(rho.partial_trace(&[0, 1]).is_err());
        assert!(rho.reduce_to_qubit(5).is_err());
    }

    #[test]
    fn test_from_matrix_shape_checks() {
        assert!(DensityOperator::from_matrix(DMatrix::from_element(3, 3, Complex64::zero())).is_err());
        assert!(DensityOperator::from_matrix(DMatrix::from_element(2, 4, Complex64::zero())).is_err());
        let ok = DensityOperator::from_matrix(DMatrix::identity(4, 4)).unwrap();
        assert_eq!(ok.num_qubits(), 2);
    }
}
