// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`blochpath::operations::Operation`) over a fixed register of
//! qubits.
//!
//! Circuits can be assembled programmatically with [`CircuitBuilder`], parsed
//! from a gate-token string ([`tokens`]) or interpreted from an OpenQASM 2.0
//! subset ([`qasm`]).

pub mod qasm;
pub mod tokens;

use crate::core::{BlochError, Result};
use crate::operations::{Gate, Operation};
use std::collections::HashSet;
use std::fmt;

/// How parsers treat gate names they do not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Fail with [`BlochError::InvalidCircuit`] naming the unknown gate.
    Strict,
    /// Skip unknown gates and keep going.
    #[default]
    Permissive,
}

/// An ordered sequence of operations applied to `num_qubits` qubits.
///
/// The order is significant: the simulator records one snapshot after every
/// unitary operation, in sequence.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    /// Size of the register. Every operation index is below this.
    num_qubits: usize,
    /// The ordered sequence of operations defining the circuit's logic.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new, empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            operations: Vec::new(),
        }
    }

    /// Appends a single operation after checking it against the register.
    ///
    /// # Errors
    /// `InvalidCircuit` if a target index is out of range, a multi-qubit gate
    /// repeats a qubit, or the number of targets does not match the gate's arity.
    pub fn add_operation(&mut self, op: Operation) -> Result<()> {
        self.check_operation(&op)?;
        self.operations.push(op);
        Ok(())
    }

    /// Appends multiple operations, stopping at the first invalid one.
    pub fn add_operations<I>(&mut self, ops: I) -> Result<()>
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op)?;
        }
        Ok(())
    }

    /// Re-checks every operation and the register size.
    pub fn validate(&self) -> Result<()> {
        if self.num_qubits == 0 {
            return Err(BlochError::invalid_circuit("circuit must act on at least one qubit"));
        }
        self.operations.iter().try_for_each(|op| self.check_operation(op))
    }

    fn check_operation(&self, op: &Operation) -> Result<()> {
        let qubits = op.involved_qubits();
        if let Some(&q) = qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(BlochError::invalid_circuit(format!(
                "qubit index {} out of range for {} qubits in '{}'",
                q, self.num_qubits, op
            )));
        }
        if let Operation::Gate { gate, qubits } = op {
            if qubits.len() != gate.arity() {
                return Err(BlochError::invalid_circuit(format!(
                    "gate '{}' acts on {} qubit(s) but {} were given",
                    gate.name(),
                    gate.arity(),
                    qubits.len()
                )));
            }
            let distinct: HashSet<usize> = qubits.iter().copied().collect();
            if distinct.len() != qubits.len() {
                return Err(BlochError::invalid_circuit(format!(
                    "gate '{}' repeats a qubit in {:?}",
                    gate.name(),
                    qubits
                )));
            }
        }
        Ok(())
    }

    /// Number of qubits in the register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Returns a slice containing the ordered sequence of operations in this circuit.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations that change the state (gates, not measure/barrier).
    pub fn gate_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_unitary()).count()
    }

    /// Returns the total number of operations defined in the circuit.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
///
/// Validation is deferred to [`CircuitBuilder::build`] so that chains stay
/// free of `?` at every step.
pub struct CircuitBuilder {
    num_qubits: usize,
    operations: Vec<Operation>,
}

impl CircuitBuilder {
    /// Creates a new, empty builder over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            operations: Vec::new(),
        }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Adds multiple operations from an iterator to the circuit being built.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.operations.extend(ops);
        self
    }

    /// Adds a single-qubit gate.
    pub fn gate(self, gate: Gate, qubit: usize) -> Self {
        self.add_op(Operation::gate(gate, [qubit]))
    }

    /// Adds a two-qubit gate; for controlled gates `first` is the control.
    pub fn gate2(self, gate: Gate, first: usize, second: usize) -> Self {
        self.add_op(Operation::gate(gate, [first, second]))
    }

    /// Adds a measurement of `qubit` into classical bit `clbit`.
    pub fn measure(self, qubit: usize, clbit: usize) -> Self {
        self.add_op(Operation::Measure { qubit, clbit })
    }

    /// Finalizes the construction process and returns the validated `Circuit`.
    pub fn build(self) -> Result<Circuit> {
        if self.num_qubits == 0 {
            return Err(BlochError::invalid_circuit("circuit must act on at least one qubit"));
        }
        let mut circuit = Circuit::new(self.num_qubits);
        circuit.add_operations(self.operations)?;
        Ok(circuit)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_qubits = self.num_qubits;
        if self.operations.is_empty() || num_qubits == 0 {
            return writeln!(f, "blochpath::Circuit[0 operations on {} qubits]", num_qubits);
        }

        let ops = &self.operations;
        let num_ops = ops.len();

        let labels: Vec<String> = (0..num_qubits).map(|q| format!("q{}: ", q)).collect();
        let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let label_padding = " ".repeat(label_width);

        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the gate/wire segment,
        // v_connect[row][time] the vertical connector drawn below that row.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Gate { gate, qubits } => match qubits.as_slice() {
                    [q] => {
                        if matches!(gate, Gate::I) {
                            continue; // leave the wire
                        }
                        op_grid[*q][t] = format_gate(gate.symbol());
                    }
                    [a, b] => {
                        if gate.is_controlled() {
                            op_grid[*a][t] = format_gate("@");
                        } else {
                            op_grid[*a][t] = format_gate(gate.symbol());
                        }
                        op_grid[*b][t] = format_gate(gate.symbol());

                        let r_min = (*a).min(*b);
                        let r_max = (*a).max(*b);
                        for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                            row_vec[t] = V_WIRE;
                        }
                    }
                    _ => {}
                },
                Operation::Measure { qubit, .. } => {
                    op_grid[*qubit][t] = format_gate("M");
                }
                Operation::Barrier { qubits } => {
                    for q in qubits {
                        op_grid[*q][t] = format_gate("░");
                    }
                }
            }
        }

        writeln!(f, "blochpath::Circuit[{} operations on {} qubits]", num_ops, num_qubits)?;
        for r in 0..num_qubits {
            write!(f, "{:<width$}", labels[r], width = label_width)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
