//! Builds a Bell pair, prints the circuit and the per-step observables, then
//! runs the same circuit through the JSON service boundary.
//!
//! `RUST_LOG=blochpath=debug cargo run --example bell_timeline` shows the
//! per-gate tracing output.

use blochpath::observables::bloch_path;
use blochpath::service;
use blochpath::{BlochError, CircuitBuilder, Gate, Simulator};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), BlochError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let circuit = CircuitBuilder::new(2)
        .gate(Gate::H, 0)
        .gate2(Gate::CX, 0, 1)
        .gate(Gate::RY(0.5), 1)
        .build()?;
    println!("Circuit:\n{}", circuit);

    let simulator = Simulator::new();
    let timeline = simulator.run(&circuit)?;
    println!("{}", timeline);

    for step in &timeline {
        println!(
            "step {}: full purity {:.4}, max qubit entropy {:.4}, entangled: {}",
            step.step,
            step.metrics.full_system_purity,
            step.metrics.max_qubit_entropy,
            step.metrics.is_entangled
        );
    }

    // Path of qubit 0 between the first two snapshots, for animation.
    let start = timeline.steps()[0].bloch_spheres[0].bloch();
    let end = timeline.steps()[1].bloch_spheres[0].bloch();
    for point in bloch_path(&start, &end, 5) {
        println!("  {}", point);
    }

    let body = r#"{
        "qasm_code": "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nh q[0];\ncx q[0],q[1];",
        "num_qubits": 2,
        "qubits_to_trace_out": [1]
    }"#;
    let reply = service::respond(&simulator, body);
    println!("HTTP {}: {}", reply.status, reply.body);
    Ok(())
}
