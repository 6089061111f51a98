// src/operations/mod.rs

//! Defines the gate catalogue and the operations a circuit is built from.
//!
//! Every [`Gate`] knows its arity, its display symbol and its unitary matrix.
//! Matrices are written in the gate's local basis: for two-qubit gates the
//! row/column index is `2 * b0 + b1`, where `b0` is the bit of the first listed
//! qubit (the control, for controlled gates) and `b1` the bit of the second.

use num_complex::Complex64;
use num_traits::{One, Zero};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// A 2x2 single-qubit unitary.
pub type Matrix2 = [[Complex64; 2]; 2];
/// A 4x4 two-qubit unitary.
pub type Matrix4 = [[Complex64; 4]; 4];

/// The unitary of a gate, sized by its arity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateMatrix {
    /// Acts on one qubit.
    Single(Matrix2),
    /// Acts on an ordered pair of qubits.
    Two(Matrix4),
}

/// Supported unitary gates. Parametric variants carry their angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Identity.
    I,
    /// Hadamard.
    H,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
    /// Phase (π/2).
    S,
    /// Inverse phase (−π/2).
    Sdg,
    /// π/4 phase.
    T,
    /// Inverse π/4 phase.
    Tdg,
    /// Square root of X.
    SX,
    /// Inverse square root of X.
    SXdg,
    /// Rotation about X by θ.
    RX(f64),
    /// Rotation about Y by θ.
    RY(f64),
    /// Rotation about Z by θ.
    RZ(f64),
    /// Phase shift `diag(1, e^{iλ})`.
    Phase(f64),
    /// Generic single-qubit rotation `U(θ, φ, λ)`.
    U(f64, f64, f64),
    /// Controlled X (control, target).
    CX,
    /// Controlled Y (control, target).
    CY,
    /// Controlled Z (control, target).
    CZ,
    /// Controlled Hadamard (control, target).
    CH,
    /// Controlled phase shift (control, target).
    CPhase(f64),
    /// Controlled RX (control, target).
    CRX(f64),
    /// Controlled RY (control, target).
    CRY(f64),
    /// Controlled RZ (control, target).
    CRZ(f64),
    /// Swap of two qubits.
    Swap,
}

impl Gate {
    /// Number of qubits this gate acts on.
    pub fn arity(&self) -> usize {
        match self.matrix() {
            GateMatrix::Single(_) => 1,
            GateMatrix::Two(_) => 2,
        }
    }

    /// Lower-case mnemonic, as used in OpenQASM.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I => "id",
            Gate::H => "h",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::T => "t",
            Gate::Tdg => "tdg",
            Gate::SX => "sx",
            Gate::SXdg => "sxdg",
            Gate::RX(_) => "rx",
            Gate::RY(_) => "ry",
            Gate::RZ(_) => "rz",
            Gate::Phase(_) => "p",
            Gate::U(..) => "u",
            Gate::CX => "cx",
            Gate::CY => "cy",
            Gate::CZ => "cz",
            Gate::CH => "ch",
            Gate::CPhase(_) => "cp",
            Gate::CRX(_) => "crx",
            Gate::CRY(_) => "cry",
            Gate::CRZ(_) => "crz",
            Gate::Swap => "swap",
        }
    }

    /// Short symbol used when drawing circuits. For controlled gates this is
    /// the symbol drawn on the target wire.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::I => "I",
            Gate::H | Gate::CH => "H",
            Gate::X | Gate::CX => "X",
            Gate::Y | Gate::CY => "Y",
            Gate::Z | Gate::CZ => "Z",
            Gate::S => "S",
            Gate::Sdg => "S†",
            Gate::T => "T",
            Gate::Tdg => "T†",
            Gate::SX => "√X",
            Gate::SXdg => "√X†",
            Gate::RX(_) | Gate::CRX(_) => "RX",
            Gate::RY(_) | Gate::CRY(_) => "RY",
            Gate::RZ(_) | Gate::CRZ(_) => "RZ",
            Gate::Phase(_) | Gate::CPhase(_) => "P",
            Gate::U(..) => "U",
            Gate::Swap => "x",
        }
    }

    /// Whether the gate is a controlled gate (first qubit is the control).
    pub fn is_controlled(&self) -> bool {
        matches!(
            self,
            Gate::CX
                | Gate::CY
                | Gate::CZ
                | Gate::CH
                | Gate::CPhase(_)
                | Gate::CRX(_)
                | Gate::CRY(_)
                | Gate::CRZ(_)
        )
    }

    /// Angle parameters, in declaration order.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            Gate::RX(t) | Gate::RY(t) | Gate::RZ(t) | Gate::Phase(t) => vec![t],
            Gate::CPhase(t) | Gate::CRX(t) | Gate::CRY(t) | Gate::CRZ(t) => vec![t],
            Gate::U(theta, phi, lambda) => vec![theta, phi, lambda],
            _ => Vec::new(),
        }
    }

    /// The unitary matrix of this gate.
    pub fn matrix(&self) -> GateMatrix {
        let one = Complex64::one();
        let zero = Complex64::zero();
        let i = Complex64::i();
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);

        match *self {
            Gate::I => GateMatrix::Single([[one, zero], [zero, one]]),
            Gate::H => GateMatrix::Single([[h, h], [h, -h]]),
            Gate::X => GateMatrix::Single([[zero, one], [one, zero]]),
            Gate::Y => GateMatrix::Single([[zero, -i], [i, zero]]),
            Gate::Z => GateMatrix::Single([[one, zero], [zero, -one]]),
            Gate::S => GateMatrix::Single(phase_matrix(std::f64::consts::FRAC_PI_2)),
            Gate::Sdg => GateMatrix::Single(phase_matrix(-std::f64::consts::FRAC_PI_2)),
            Gate::T => GateMatrix::Single(phase_matrix(std::f64::consts::FRAC_PI_4)),
            Gate::Tdg => GateMatrix::Single(phase_matrix(-std::f64::consts::FRAC_PI_4)),
            Gate::SX => GateMatrix::Single([
                [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
                [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
            ]),
            Gate::SXdg => GateMatrix::Single([
                [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
                [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
            ]),
            Gate::RX(theta) => GateMatrix::Single(rx_matrix(theta)),
            Gate::RY(theta) => GateMatrix::Single(ry_matrix(theta)),
            Gate::RZ(theta) => GateMatrix::Single(rz_matrix(theta)),
            Gate::Phase(lambda) => GateMatrix::Single(phase_matrix(lambda)),
            Gate::U(theta, phi, lambda) => GateMatrix::Single(u_matrix(theta, phi, lambda)),
            Gate::CX => GateMatrix::Two(controlled(&[[zero, one], [one, zero]])),
            Gate::CY => GateMatrix::Two(controlled(&[[zero, -i], [i, zero]])),
            Gate::CZ => GateMatrix::Two(controlled(&[[one, zero], [zero, -one]])),
            Gate::CH => GateMatrix::Two(controlled(&[[h, h], [h, -h]])),
            Gate::CPhase(lambda) => GateMatrix::Two(controlled(&phase_matrix(lambda))),
            Gate::CRX(theta) => GateMatrix::Two(controlled(&rx_matrix(theta))),
            Gate::CRY(theta) => GateMatrix::Two(controlled(&ry_matrix(theta))),
            Gate::CRZ(theta) => GateMatrix::Two(controlled(&rz_matrix(theta))),
            Gate::Swap => GateMatrix::Two([
                [one, zero, zero, zero],
                [zero, zero, one, zero],
                [zero, one, zero, zero],
                [zero, zero, zero, one],
            ]),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        if params.is_empty() {
            write!(f, "{}", self.name())
        } else {
            let rendered: Vec<String> = params.iter().map(|p| format!("{:.4}", p)).collect();
            write!(f, "{}({})", self.name(), rendered.join(","))
        }
    }
}

/// `diag(1, e^{iλ})`
fn phase_matrix(lambda: f64) -> Matrix2 {
    [
        [Complex64::one(), Complex64::zero()],
        [Complex64::zero(), Complex64::from_polar(1.0, lambda)],
    ]
}

// Rx(θ) = [[cos(θ/2), -i sin(θ/2)], [-i sin(θ/2), cos(θ/2)]]
fn rx_matrix(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
        [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
    ]
}

// Ry(θ) = [[cos(θ/2), -sin(θ/2)], [sin(θ/2), cos(θ/2)]]
fn ry_matrix(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
        [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
    ]
}

// Rz(θ) = diag(e^{-iθ/2}, e^{iθ/2})
fn rz_matrix(theta: f64) -> Matrix2 {
    [
        [Complex64::from_polar(1.0, -theta / 2.0), Complex64::zero()],
        [Complex64::zero(), Complex64::from_polar(1.0, theta / 2.0)],
    ]
}

fn u_matrix(theta: f64, phi: f64, lambda: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), -Complex64::from_polar(s, lambda)],
        [Complex64::from_polar(s, phi), Complex64::from_polar(c, phi + lambda)],
    ]
}

/// Lifts a single-qubit `u` to `|0⟩⟨0| ⊗ I + |1⟩⟨1| ⊗ u` in the
/// (control, target) basis.
fn controlled(u: &Matrix2) -> Matrix4 {
    let one = Complex64::one();
    let zero = Complex64::zero();
    [
        [one, zero, zero, zero],
        [zero, one, zero, zero],
        [zero, zero, u[0][0], u[0][1]],
        [zero, zero, u[1][0], u[1][1]],
    ]
}

/// One step of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A unitary gate applied to `qubits` (controls first).
    Gate {
        /// The unitary to apply.
        gate: Gate,
        /// Target qubit indices, in the gate's local order.
        qubits: Vec<usize>,
    },

    /// A computational-basis measurement. Carried by parsed circuits but
    /// skipped by the evolution engine: it neither collapses the state nor
    /// produces a snapshot.
    Measure {
        /// Measured qubit.
        qubit: usize,
        /// Classical bit the outcome would be written to.
        clbit: usize,
    },

    /// A scheduling barrier. No effect on the state.
    Barrier {
        /// Qubits spanned by the barrier.
        qubits: Vec<usize>,
    },
}

impl Operation {
    /// Convenience constructor for a gate operation.
    pub fn gate(gate: Gate, qubits: impl Into<Vec<usize>>) -> Self {
        Operation::Gate { gate, qubits: qubits.into() }
    }

    /// Returns every qubit index the operation names.
    pub fn involved_qubits(&self) -> Vec<usize> {
        match self {
            Operation::Gate { qubits, .. } => qubits.clone(),
            Operation::Measure { qubit, .. } => vec![*qubit],
            Operation::Barrier { qubits } => qubits.clone(),
        }
    }

    /// Whether the operation changes the state vector.
    pub fn is_unitary(&self) -> bool {
        matches!(self, Operation::Gate { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Gate { gate, qubits } => {
                let targets: Vec<String> = qubits.iter().map(|q| format!("q[{}]", q)).collect();
                write!(f, "{} {}", gate, targets.join(","))
            }
            Operation::Measure { qubit, clbit } => write!(f, "measure q[{}] -> c[{}]", qubit, clbit),
            Operation::Barrier { qubits } => {
                let targets: Vec<String> = qubits.iter().map(|q| format!("q[{}]", q)).collect();
                write!(f, "barrier {}", targets.join(","))
            }
        }
    }
}
