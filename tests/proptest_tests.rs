//! Property-based tests for blochpath using proptest
//!
//! Invariants that must hold for every circuit and every input state.

use blochpath::{
    check_density_operator, check_normalization, purity, von_neumann_entropy, Circuit,
    DensityOperator, Gate, Operation, Simulator, StateVector,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

const TOL: f64 = 1e-9;

/// Maps raw draws onto a gate that fits the register. Two-qubit picks fall
/// back to a rotation on a single-qubit register.
fn pick_gate(num_qubits: usize, kind: u8, theta: f64, a: usize, b: usize) -> Operation {
    let q = a % num_qubits;
    let r = if num_qubits > 1 {
        (q + 1 + b % (num_qubits - 1)) % num_qubits
    } else {
        q
    };
    let single = |g: Gate| Operation::gate(g, [q]);
    let pair = |g: Gate| {
        if num_qubits > 1 {
            Operation::gate(g, [q, r])
        } else {
            Operation::gate(Gate::RX(theta), [q])
        }
    };
    match kind % 14 {
        0 => single(Gate::H),
        1 => single(Gate::X),
        2 => single(Gate::Y),
        3 => single(Gate::S),
        4 => single(Gate::T),
        5 => single(Gate::RX(theta)),
        6 => single(Gate::RY(theta)),
        7 => single(Gate::RZ(theta)),
        8 => single(Gate::U(theta, theta / 2.0, -theta)),
        9 => pair(Gate::CX),
        10 => pair(Gate::CZ),
        11 => pair(Gate::Swap),
        12 => pair(Gate::CRY(theta)),
        _ => pair(Gate::CPhase(theta)),
    }
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1usize..=4).prop_flat_map(|n| {
        prop::collection::vec((any::<u8>(), -PI..PI, 0usize..8, 0usize..8), 0..12).prop_map(
            move |picks| {
                let mut circuit = Circuit::new(n);
                for (kind, theta, a, b) in picks {
                    circuit
                        .add_operation(pick_gate(n, kind, theta, a, b))
                        .expect("generated operation fits the register");
                }
                circuit
            },
        )
    })
}

proptest! {
    /// Property: every snapshot stays normalized
    #[test]
    fn evolution_preserves_norm(circuit in arb_circuit()) {
        let states = Simulator::new().evolve(&circuit, None).unwrap();
        prop_assert_eq!(states.len(), circuit.gate_count() + 1);
        for state in &states {
            prop_assert!(check_normalization(state, Some(TOL)).is_ok());
        }
    }

    /// Property: projected operators are Hermitian with unit trace
    #[test]
    fn projection_is_valid_density_operator(num_qubits in 1usize..=4, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = StateVector::random(num_qubits, &mut rng).unwrap();
        let rho = DensityOperator::from_state(&state);
        prop_assert!(check_density_operator(&rho, Some(TOL)).is_ok());
        prop_assert!((purity(&rho) - 1.0).abs() < TOL);
    }

    /// Property: every single-qubit reduction is a valid operator with purity in
    /// [0.5, 1] and unit trace
    #[test]
    fn reduced_operators_are_bounded(num_qubits in 1usize..=4, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = StateVector::random(num_qubits, &mut rng).unwrap();
        let rho = DensityOperator::from_state(&state);
        for q in 0..num_qubits {
            let reduced = rho.reduce_to_qubit(q).unwrap();
            prop_assert!(check_density_operator(&reduced, Some(TOL)).is_ok());
            let p = purity(&reduced);
            prop_assert!((0.25..=1.0 + TOL).contains(&p), "purity {} out of range", p);
            prop_assert!(p >= 0.5 - TOL);
            let s = von_neumann_entropy(&reduced);
            prop_assert!((-TOL..=1.0 + 1e-6).contains(&s), "entropy {} out of range", s);
        }
    }

    /// Property: a single-qubit partial trace is the identity
    #[test]
    fn single_qubit_reduction_is_identity(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let rho = DensityOperator::from_state(&StateVector::random(1, &mut rng).unwrap());
        prop_assert_eq!(rho.reduce_to_qubit(0).unwrap(), rho);
    }

    /// Property: Bloch vectors never leave the unit ball, pure reductions have
    /// zero entropy and sit on the sphere
    #[test]
    fn timeline_observables_are_physical(circuit in arb_circuit()) {
        let timeline = Simulator::new().run(&circuit).unwrap();
        for step in timeline.steps() {
            prop_assert!((step.metrics.full_system_purity - 1.0).abs() < 1e-6);
            prop_assert!(step.metrics.full_system_entropy < 1e-6);
            for obs in &step.bloch_spheres {
                let norm = obs.bloch().norm();
                prop_assert!(norm <= 1.0 + 1e-6, "Bloch norm {} > 1", norm);
                if obs.purity > 1.0 - 1e-9 {
                    prop_assert!(obs.entropy < 1e-6);
                    prop_assert!((norm - 1.0).abs() < 1e-6);
                }
            }
        }
    }

    /// Property: H applied twice returns any starting state
    #[test]
    fn hadamard_twice_is_identity(num_qubits in 1usize..=4, target in 0usize..4, seed in any::<u64>()) {
        let target = target % num_qubits;
        let mut rng = StdRng::seed_from_u64(seed);
        let start = StateVector::random(num_qubits, &mut rng).unwrap();
        let mut circuit = Circuit::new(num_qubits);
        circuit.add_operation(Operation::gate(Gate::H, [target])).unwrap();
        circuit.add_operation(Operation::gate(Gate::H, [target])).unwrap();
        let states = Simulator::new().evolve(&circuit, Some(start.clone())).unwrap();
        prop_assert!(states[2].approx_eq(&start, TOL));
    }
}
