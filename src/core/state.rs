// src/core/state.rs

use super::constants::bloch_constants::NORM_TOLERANCE;
use super::error::{BlochError, Result};
use num_complex::Complex64;
use num_traits::{One, Zero};
use rand::distr::{Distribution, StandardUniform};
use std::fmt;

/// A pure state of `n` qubits: a unit-norm complex vector of length `2^n`.
///
/// Basis indices are little-endian: qubit `q` is bit `q` of the index, so for
/// two qubits the amplitudes are ordered `|q1 q0⟩ = |00⟩, |01⟩, |10⟩, |11⟩`.
///
/// A `StateVector` is never mutated after construction. Evolution produces a
/// fresh vector per applied gate, which lets the simulator keep every
/// intermediate snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl StateVector {
    /// The computational basis state `|0...0⟩`.
    pub fn zero(num_qubits: usize) -> Result<Self> {
        let dim = dimension_for(num_qubits)?;
        let mut amplitudes = vec![Complex64::zero(); dim];
        amplitudes[0] = Complex64::one();
        Ok(Self { amplitudes, num_qubits })
    }

    /// The computational basis state `|index⟩`.
    pub fn basis(num_qubits: usize, index: usize) -> Result<Self> {
        let dim = dimension_for(num_qubits)?;
        if index >= dim {
            return Err(BlochError::invalid_circuit(format!(
                "basis index {} out of range for {} qubits",
                index, num_qubits
            )));
        }
        let mut amplitudes = vec![Complex64::zero(); dim];
        amplitudes[index] = Complex64::one();
        Ok(Self { amplitudes, num_qubits })
    }

    /// Builds a state from caller-supplied amplitudes.
    ///
    /// The length must be a power of two (at least 2) and the norm must be 1
    /// within `tolerance` (default [`NORM_TOLERANCE`]). The vector is not
    /// renormalized.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>, tolerance: Option<f64>) -> Result<Self> {
        let dim = amplitudes.len();
        if dim < 2 || !dim.is_power_of_two() {
            return Err(BlochError::invalid_circuit(format!(
                "state vector length {} is not a power of two >= 2",
                dim
            )));
        }
        let num_qubits = dim.trailing_zeros() as usize;
        let state = Self { amplitudes, num_qubits };

        let tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
        let norm_sq = state.norm_sqr();
        if (norm_sq - 1.0).abs() > tolerance {
            return Err(BlochError::numeric_anomaly(format!(
                "state vector is not normalized: sum(|c_i|^2) = {} (deviation > {})",
                norm_sq, tolerance
            )));
        }
        Ok(state)
    }

    /// A random normalized state drawn from `rng`. Not Haar-distributed; it is
    /// meant for property tests and demos that need arbitrary valid inputs.
    pub fn random<R: rand::Rng + ?Sized>(num_qubits: usize, rng: &mut R) -> Result<Self> {
        let dim = dimension_for(num_qubits)?;
        loop {
            let amplitudes: Vec<Complex64> = (0..dim)
                .map(|_| {
                    let re: f64 = StandardUniform.sample(rng);
                    let im: f64 = StandardUniform.sample(rng);
                    Complex64::new(2.0 * re - 1.0, 2.0 * im - 1.0)
                })
                .collect();
            let norm = amplitudes.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
            // Resample the (vanishingly unlikely) all-zero draw.
            if norm > 1e-6 {
                let amplitudes = amplitudes.into_iter().map(|c| c / norm).collect();
                return Ok(Self { amplitudes, num_qubits });
            }
        }
    }

    /// Wraps an already-evolved vector. Callers inside the crate guarantee the
    /// dimension matches `num_qubits`.
    pub(crate) fn from_evolved(amplitudes: Vec<Complex64>, num_qubits: usize) -> Self {
        debug_assert_eq!(amplitudes.len(), 1usize << num_qubits);
        Self { amplitudes, num_qubits }
    }

    /// Read-only access to the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Number of qubits described by this state.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Length of the amplitude vector (`2^num_qubits`).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// ‖ψ‖².
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// ⟨self|other⟩. Returns `None` when the dimensions differ.
    pub fn inner(&self, other: &StateVector) -> Option<Complex64> {
        if self.dim() != other.dim() {
            return None;
        }
        Some(
            self.amplitudes
                .iter()
                .zip(other.amplitudes.iter())
                .map(|(a, b)| a.conj() * b)
                .sum(),
        )
    }

    /// Component-wise comparison within `tolerance` (global phase is significant).
    pub fn approx_eq(&self, other: &StateVector, tolerance: f64) -> bool {
        self.dim() == other.dim()
            && self
                .amplitudes
                .iter()
                .zip(other.amplitudes.iter())
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }
}

/// `2^num_qubits`, rejecting zero qubits and shifts that overflow.
pub(crate) fn dimension_for(num_qubits: usize) -> Result<usize> {
    if num_qubits == 0 {
        return Err(BlochError::invalid_circuit("qubit count must be at least 1"));
    }
    u32::try_from(num_qubits)
        .ok()
        .and_then(|n| 1usize.checked_shl(n))
        .ok_or_else(|| {
            BlochError::invalid_circuit(format!(
                "{} qubits overflow the state vector dimension",
                num_qubits
            ))
        })
}

/// Formats one amplitude as `a+bj`, dropping the noise below 1e-12.
fn format_amplitude(c: &Complex64) -> String {
    let clean = |v: f64| if v.abs() < 1e-12 { 0.0 } else { v };
    let (re, im) = (clean(c.re), clean(c.im));
    let sign = if im < 0.0 { '-' } else { '+' };
    format!("{:.8}{}{:.8}j", re, sign, im.abs())
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Statevector([")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { ", " } else { "" }, format_amplitude(c))?;
        }
        write!(f, "], dims=(")?;
        if self.num_qubits == 1 {
            write!(f, "2,")?;
        } else {
            let dims = vec!["2"; self.num_qubits];
            write!(f, "{}", dims.join(", "))?;
        }
        write!(f, "))")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_zero_state() -> Result<()> {
        let psi = StateVector::zero(3)?;
        assert_eq!(psi.dim(), 8);
        assert_eq!(psi.num_qubits(), 3);
        assert_eq!(psi.amplitudes()[0], Complex64::one());
        assert!(psi.amplitudes()[1..].iter().all(|c| c.is_zero()));
        Ok(())
    }

    #[test]
    fn test_zero_qubits_rejected() {
        assert!(matches!(StateVector::zero(0), Err(BlochError::InvalidCircuit { .. })));
    }

    #[test]
    fn test_from_amplitudes_checks_norm_and_length() {
        let bad_len = vec![Complex64::one(); 3];
        assert!(matches!(
            StateVector::from_amplitudes(bad_len, None),
            Err(BlochError::InvalidCircuit { .. })
        ));

        let unnormalized = vec![Complex64::one(), Complex64::one()];
        assert!(matches!(
            StateVector::from_amplitudes(unnormalized, None),
            Err(BlochError::NumericAnomaly { .. })
        ));

        let plus = vec![Complex64::new(FRAC_1_SQRT_2, 0.0); 2];
        let psi = StateVector::from_amplitudes(plus, None).unwrap();
        assert_eq!(psi.num_qubits(), 1);
    }

    #[test]
    fn test_random_state_is_normalized() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=4 {
            let psi = StateVector::random(n, &mut rng)?;
            assert!((psi.norm_sqr() - 1.0).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_inner_product() -> Result<()> {
        let zero = StateVector::basis(1, 0)?;
        let one = StateVector::basis(1, 1)?;
        assert_eq!(zero.inner(&zero), Some(Complex64::one()));
        assert_eq!(zero.inner(&one), Some(Complex64::zero()));
        assert_eq!(zero.inner(&StateVector::zero(2)?), None);
        Ok(())
    }

    #[test]
    fn test_display_format() -> Result<()> {
        let psi = StateVector::zero(1)?;
        assert_eq!(
            psi.to_string(),
            "Statevector([1.00000000+0.00000000j, 0.00000000+0.00000000j], dims=(2,))"
        );
        let psi = StateVector::zero(2)?;
        assert!(psi.to_string().ends_with("dims=(2, 2))"));
        Ok(())
    }
}
