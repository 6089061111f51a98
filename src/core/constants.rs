//! Numeric thresholds shared by the engine and the observable extractor.
//!
//! The classification thresholds here are fixed. Tolerances that callers may
//! reasonably tune live in [`crate::simulation::SimulatorConfig`] instead.

/// Fixed thresholds and default tolerances.
pub mod bloch_constants {
    /// Default allowed deviation of ‖ψ‖² from 1.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Default allowed magnitude of anti-Hermitian parts and of trace deviation.
    pub const HERMITIAN_TOLERANCE: f64 = 1e-9;
    /// Eigenvalues at or below this are dropped from the entropy sum.
    pub const EIGENVALUE_THRESHOLD: f64 = 1e-9;
    /// `purity > PURE_THRESHOLD` is reported as "pure". Approximate, not a rank test.
    pub const PURE_THRESHOLD: f64 = 0.999;
    /// Entanglement heuristic: purity must fall below this.
    pub const ENTANGLEMENT_PURITY_THRESHOLD: f64 = 0.6;
    /// Entanglement heuristic: entropy must exceed this.
    pub const ENTANGLEMENT_ENTROPY_THRESHOLD: f64 = 0.5;
    /// Default upper bound on simulated qubits (density operators are 4^n).
    pub const DEFAULT_MAX_QUBITS: usize = 10;
    /// Hard ceiling for `max_qubits`. Every step builds and diagonalizes the full 2^n x 2^n operator.
    pub const MAX_QUBITS_CEILING: usize = 12;
}
