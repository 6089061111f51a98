// src/observables/mod.rs

//! Scalar and geometric observables of density operators.
//!
//! Every function here is read-only: nothing is renormalized, and a
//! violated invariant is reported as an error rather than corrected.

pub mod bloch;

pub use bloch::{bloch_path, BlochVector};

use crate::core::{
    BlochError, Result, EIGENVALUE_THRESHOLD, HERMITIAN_TOLERANCE, PURE_THRESHOLD,
};
use crate::density::DensityOperator;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

const PAULI_X: [[Complex64; 2]; 2] = [
    [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
    [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
];
const PAULI_Y: [[Complex64; 2]; 2] = [
    [Complex64::new(0.0, 0.0), Complex64::new(0.0, -1.0)],
    [Complex64::new(0.0, 1.0), Complex64::new(0.0, 0.0)],
];
const PAULI_Z: [[Complex64; 2]; 2] = [
    [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
    [Complex64::new(0.0, 0.0), Complex64::new(-1.0, 0.0)],
];

/// Re Tr(ρ²). Ranges from `1/d` (maximally mixed) to 1 (pure).
pub fn purity(rho: &DensityOperator) -> f64 {
    let m = rho.matrix();
    let dim = rho.dim();
    let mut sum = Complex64::new(0.0, 0.0);
    for i in 0..dim {
        for j in 0..dim {
            sum += m[(i, j)] * m[(j, i)];
        }
    }
    sum.re
}

/// −Σ λ log₂ λ over the eigenvalues λ of ρ above [`EIGENVALUE_THRESHOLD`].
///
/// Returns 0.0 for a pure state and `log₂ d` for the maximally mixed state.
pub fn von_neumann_entropy(rho: &DensityOperator) -> f64 {
    let eigenvalues = rho.matrix().symmetric_eigenvalues();
    let entropy: f64 = eigenvalues
        .iter()
        .filter(|&&lambda| lambda > EIGENVALUE_THRESHOLD)
        .map(|&lambda| -lambda * lambda.log2())
        .sum();
    // Rounding can leave a tiny negative value for pure states.
    entropy.max(0.0)
}

/// Bloch vector of a single-qubit operator, with the default imaginary-part
/// tolerance [`HERMITIAN_TOLERANCE`].
pub fn bloch_vector(rho: &DensityOperator) -> Result<BlochVector> {
    bloch_vector_within(rho, HERMITIAN_TOLERANCE)
}

/// Bloch vector (Tr(ρσx), Tr(ρσy), Tr(ρσz)).
///
/// # Errors
/// * `ShapeMismatch` if ρ is not 2x2.
/// * `NumericAnomaly` if an expectation value has an imaginary part above
///   `tolerance`, which means ρ was not Hermitian.
pub fn bloch_vector_within(rho: &DensityOperator, tolerance: f64) -> Result<BlochVector> {
    let shape = rho.matrix().shape();
    if shape != (2, 2) {
        return Err(BlochError::shape_mismatch((2, 2), shape));
    }
    let x = real_expectation(rho, &PAULI_X, "x", tolerance)?;
    let y = real_expectation(rho, &PAULI_Y, "y", tolerance)?;
    let z = real_expectation(rho, &PAULI_Z, "z", tolerance)?;
    Ok(BlochVector::new(x, y, z))
}

/// Tr(ρσ) = Σ ρ_ij σ_ji, checked to be real.
fn real_expectation(
    rho: &DensityOperator,
    pauli: &[[Complex64; 2]; 2],
    axis: &str,
    tolerance: f64,
) -> Result<f64> {
    let m = rho.matrix();
    let mut value = Complex64::new(0.0, 0.0);
    for i in 0..2 {
        for j in 0..2 {
            value += m[(i, j)] * pauli[j][i];
        }
    }
    if value.im.abs() > tolerance {
        return Err(BlochError::numeric_anomaly(format!(
            "Bloch {}-component has imaginary part {:.3e}",
            axis, value.im
        )));
    }
    Ok(value.re)
}

/// Approximate purity test: `purity > 0.999`. Not an exact rank-1 check.
pub fn is_pure(purity: f64) -> bool {
    purity > PURE_THRESHOLD
}

/// Everything reported for one qubit at one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitObservables {
    /// Index of the qubit in the register.
    pub qubit: usize,
    /// `[x, y, z]`
    pub bloch_coordinates: [f64; 3],
    /// Von Neumann entropy of the reduced operator, in bits.
    pub entropy: f64,
    /// Tr(ρ²) of the reduced operator, in `[0.5, 1]`.
    pub purity: f64,
    /// `purity > 0.999`; see [`is_pure`].
    pub is_pure: bool,
}

impl QubitObservables {
    /// Extracts all observables from the reduced 2x2 operator of `qubit`.
    pub fn from_reduced(qubit: usize, rho: &DensityOperator) -> Result<Self> {
        Self::from_reduced_within(qubit, rho, HERMITIAN_TOLERANCE)
    }

    pub(crate) fn from_reduced_within(
        qubit: usize,
        rho: &DensityOperator,
        tolerance: f64,
    ) -> Result<Self> {
        let bloch = bloch_vector_within(rho, tolerance)?;
        let purity = purity(rho);
        Ok(Self {
            qubit,
            bloch_coordinates: bloch.as_array(),
            entropy: von_neumann_entropy(rho),
            purity,
            is_pure: is_pure(purity),
        })
    }

    pub fn bloch(&self) -> BlochVector {
        BlochVector::from_array(self.bloch_coordinates)
    }
}

/// Observables of a multi-qubit subsystem left after a partial trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemObservables {
    /// Original indices of the qubits that remain, in ascending order.
    pub remaining_qubits: Vec<usize>,
    /// Tr(ρ²) of the remaining subsystem.
    pub purity: f64,
    /// Von Neumann entropy of the remaining subsystem, in bits.
    pub entropy: f64,
    /// `purity > 0.999`.
    pub is_pure: bool,
    /// Present only when exactly one qubit remains.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bloch_coordinates: Option<[f64; 3]>,
}

impl SubsystemObservables {
    /// Traces `trace_out` from `rho` and summarizes what is left.
    pub fn after_tracing_out(rho: &DensityOperator, trace_out: &[usize]) -> Result<Self> {
        let reduced = rho.partial_trace(trace_out)?;
        let remaining_qubits: Vec<usize> = (0..rho.num_qubits())
            .filter(|q| !trace_out.contains(q))
            .collect();
        let purity = purity(&reduced);
        let bloch_coordinates = if reduced.num_qubits() == 1 {
            Some(bloch_vector(&reduced)?.as_array())
        } else {
            None
        };
        Ok(Self {
            remaining_qubits,
            purity,
            entropy: von_neumann_entropy(&reduced),
            is_pure: is_pure(purity),
            bloch_coordinates,
        })
    }
}
