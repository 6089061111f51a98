// src/validation/mod.rs

//! Invariant checks for states and density operators.
//!
//! Violations surface as [`BlochError::NumericAnomaly`]; nothing here
//! renormalizes or symmetrizes its input.

use crate::core::{BlochError, Result, StateVector, HERMITIAN_TOLERANCE, NORM_TOLERANCE};
use crate::density::DensityOperator;

/// Checks that ∑|c_i|² ≈ 1.
///
/// # Arguments
/// * `state` - The state to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to [`NORM_TOLERANCE`].
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(BlochError::NumericAnomaly)` otherwise.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm_sq = state.norm_sqr();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(BlochError::numeric_anomaly(format!(
            "state vector normalization failed: sum(|c_i|^2) = {} (deviation > {})",
            norm_sq, effective_tolerance
        )))
    } else {
        Ok(())
    }
}

/// Checks ρ = ρ† element-wise within `tolerance` (default [`HERMITIAN_TOLERANCE`]).
pub fn check_hermitian(rho: &DensityOperator, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(HERMITIAN_TOLERANCE);
    let m = rho.matrix();
    let dim = rho.dim();
    for r in 0..dim {
        for c in r..dim {
            let deviation = (m[(r, c)] - m[(c, r)].conj()).norm();
            if deviation > effective_tolerance {
                return Err(BlochError::numeric_anomaly(format!(
                    "operator is not Hermitian: |rho[{r},{c}] - conj(rho[{c},{r}])| = {:.3e}",
                    deviation
                )));
            }
        }
    }
    Ok(())
}

/// Checks Tr(ρ) ≈ 1 with a vanishing imaginary part.
pub fn check_unit_trace(rho: &DensityOperator, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let trace = rho.trace();
    if (trace.re - 1.0).abs() > effective_tolerance || trace.im.abs() > effective_tolerance {
        return Err(BlochError::numeric_anomaly(format!(
            "operator trace is {} (expected 1 within {})",
            trace, effective_tolerance
        )));
    }
    Ok(())
}

/// Runs every density-operator check: Hermiticity, then unit trace.
pub fn check_density_operator(rho: &DensityOperator, tolerance: Option<f64>) -> Result<()> {
    check_hermitian(rho, tolerance)?;
    check_unit_trace(rho, tolerance)
}

/// Checks that no eigenvalue of ρ falls below `-tolerance`.
pub fn check_positive_semidefinite(rho: &DensityOperator, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(HERMITIAN_TOLERANCE);
    let eigenvalues = rho.matrix().symmetric_eigenvalues();
    match eigenvalues.iter().copied().find(|&lambda| lambda < -effective_tolerance) {
        Some(lambda) => Err(BlochError::numeric_anomaly(format!(
            "operator has negative eigenvalue {:.3e}",
            lambda
        ))),
        None => Ok(()),
    }
}

/// Checks that a computed purity lies in `[1/d, 1]` up to `tolerance`.
pub fn check_purity_bounds(purity: f64, dim: usize, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE).max(1e-12);
    let lower = 1.0 / dim as f64;
    if purity < lower - effective_tolerance || purity > 1.0 + effective_tolerance {
        return Err(BlochError::numeric_anomaly(format!(
            "purity {} outside [{}, 1] for dimension {}",
            purity, lower, dim
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use num_complex::Complex64;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_normalization_passes_for_basis_state() -> Result<()> {
        check_normalization(&StateVector::zero(3)?, None)
    }

    #[test]
    fn test_normalization_uses_given_tolerance() -> Result<()> {
        // sum = 0.5 + 0.5005 = 1.0005
        let amps = vec![
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.5005f64.sqrt(), 0.0),
        ];
        let state = StateVector::from_amplitudes(amps, Some(1e-3))?;
        assert!(check_normalization(&state, Some(1e-3)).is_ok());
        let err = check_normalization(&state, None).unwrap_err();
        assert!(matches!(err, BlochError::NumericAnomaly { .. }));
        Ok(())
    }

    #[test]
    fn test_projected_state_is_valid_density_operator() -> Result<()> {
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let state = StateVector::from_amplitudes(vec![s, Complex64::new(0.0, FRAC_1_SQRT_2)], None)?;
        check_density_operator(&DensityOperator::from_state(&state), None)
    }

    #[test]
    fn test_non_hermitian_operator_rejected() -> Result<()> {
        let m = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(0.5, 0.0),
                Complex64::new(0.5, 0.0),
                Complex64::new(-0.5, 0.0),
                Complex64::new(0.5, 0.0),
            ],
        );
        let rho = DensityOperator::from_matrix(m)?;
        assert!(check_hermitian(&rho, None).is_err());
        assert!(check_unit_trace(&rho, None).is_ok());
        Ok(())
    }

    #[test]
    fn test_trace_deviation_rejected() -> Result<()> {
        let rho = DensityOperator::from_matrix(DMatrix::identity(2, 2))?;
        assert!(check_hermitian(&rho, None).is_ok());
        assert!(check_density_operator(&rho, None).is_err());
        Ok(())
    }

    #[test]
    fn test_negative_eigenvalue_rejected() -> Result<()> {
        // diag(1.5, -0.5): Hermitian with unit trace, but not positive.
        let m = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![
            Complex64::new(1.5, 0.0),
            Complex64::new(-0.5, 0.0),
        ]));
        let rho = DensityOperator::from_matrix(m)?;
        assert!(check_density_operator(&rho, None).is_ok());
        assert!(check_positive_semidefinite(&rho, None).is_err());

        let mixed = DensityOperator::maximally_mixed(2)?;
        assert!(check_positive_semidefinite(&mixed, None).is_ok());
        Ok(())
    }

    #[test]
    fn test_purity_bounds() {
        assert!(check_purity_bounds(1.0, 2, None).is_ok());
        assert!(check_purity_bounds(0.5, 2, None).is_ok());
        assert!(check_purity_bounds(0.25, 4, None).is_ok());
        assert!(check_purity_bounds(0.4, 2, None).is_err());
        assert!(check_purity_bounds(1.01, 2, None).is_err());
    }
}
