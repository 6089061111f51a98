// src/lib.rs

//! `blochpath` - step-by-step observables of quantum state evolution
//!
//! This library evolves a pure state through a gate circuit and, after every
//! gate, reports what each qubit looks like on its own: Bloch-sphere
//! coordinates, von Neumann entropy and purity of its reduced density
//! operator, plus whole-register metrics.
//!
//! Qubit `q` is bit `q` of a basis index (little-endian) throughout.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod density;
pub mod observables;
pub mod simulation;
pub mod validation;
pub mod service;

// Re-export the most common types for easier top-level use
pub use crate::core::{BlochError, Result, StateVector};
pub use operations::{Gate, Operation};
pub use circuits::{Circuit, CircuitBuilder, ParseMode};
pub use density::DensityOperator;
pub use observables::{
    bloch_path, bloch_vector, is_pure, purity, von_neumann_entropy, BlochVector, QubitObservables,
};
pub use simulation::{Simulator, SimulatorConfig, StepSnapshot, SystemMetrics, Timeline};
pub use validation::{check_density_operator, check_normalization};

// Example 1: Hadamard on a single qubit
// |0> is the north pole; H rotates it onto the +x axis.
/// ```
/// use blochpath::{CircuitBuilder, Gate, Simulator};
///
/// let circuit = CircuitBuilder::new(1).gate(Gate::H, 0).build().unwrap();
/// let timeline = Simulator::new().run(&circuit).unwrap();
///
/// assert_eq!(timeline.len(), 2);
/// let start = timeline.steps()[0].bloch_spheres[0].bloch();
/// let end = timeline.steps()[1].bloch_spheres[0].bloch();
/// assert!((start.z - 1.0).abs() < 1e-9);
/// assert!((end.x - 1.0).abs() < 1e-9);
/// assert!(end.z.abs() < 1e-9);
/// ```
#[doc(hidden)]
const _: () = ();

// Example 2: Bell pair
// After H and CX each qubit alone is maximally mixed: the Bloch vector
// shrinks to the origin and the reduced entropy reaches one bit.
/// ```
/// use blochpath::{CircuitBuilder, Gate, Simulator};
///
/// let circuit = CircuitBuilder::new(2)
///     .gate(Gate::H, 0)
///     .gate2(Gate::CX, 0, 1)
///     .build()
///     .unwrap();
/// let timeline = Simulator::new().run(&circuit).unwrap();
/// let last = timeline.final_step().unwrap();
///
/// for qubit in &last.bloch_spheres {
///     assert!(qubit.bloch().norm() < 1e-9);
///     assert!((qubit.entropy - 1.0).abs() < 1e-6);
///     assert!(!qubit.is_pure);
/// }
/// assert!(last.metrics.is_entangled);
/// assert!((last.metrics.full_system_purity - 1.0).abs() < 1e-9);
/// ```
#[doc(hidden)]
const _: () = ();

// Example 3: OpenQASM input
/// ```
/// use blochpath::Simulator;
///
/// let source = r#"
///     OPENQASM 2.0;
///     include "qelib1.inc";
///     qreg q[2];
///     creg c[2];
///     x q[1];
///     measure q -> c;
/// "#;
/// let timeline = Simulator::new().run_qasm(source, Some(2)).unwrap();
/// // one gate, two skipped measurements
/// assert_eq!(timeline.len(), 2);
/// let q1 = timeline.final_step().unwrap().bloch_spheres[1].bloch();
/// assert!((q1.z + 1.0).abs() < 1e-9);
/// ```
#[doc(hidden)]
const _: () = ();
