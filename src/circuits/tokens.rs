// src/circuits/tokens.rs

//! Parser for compact single-qubit gate strings such as `"H S RZ(0.5) X"`.
//!
//! Tokens are separated by whitespace and matched case-insensitively.
//! Fixed gates: `H X Y Z S T`. Rotations: `RX(θ) RY(θ) RZ(θ)` with θ a
//! literal real number in radians.

use super::{Circuit, ParseMode};
use crate::core::{BlochError, Result};
use crate::operations::{Gate, Operation};
use tracing::debug;

/// Parses a whitespace-separated token string into a one-qubit circuit.
///
/// Unknown tokens are skipped in [`ParseMode::Permissive`] and rejected in
/// [`ParseMode::Strict`]. A token that opens a rotation (`RX(`, `RY(`, `RZ(`)
/// but does not carry a valid finite angle is rejected in both modes.
///
/// # Examples
/// ```
/// use blochpath::circuits::{ParseMode, tokens::parse_tokens};
///
/// let circuit = parse_tokens("h rz(1.5) X", ParseMode::Strict).unwrap();
/// assert_eq!(circuit.num_qubits(), 1);
/// assert_eq!(circuit.len(), 3);
/// ```
pub fn parse_tokens(input: &str, mode: ParseMode) -> Result<Circuit> {
    let mut circuit = Circuit::new(1);
    for raw in input.split_whitespace() {
        match parse_token(raw)? {
            Some(gate) => circuit.add_operation(Operation::gate(gate, [0]))?,
            None => match mode {
                ParseMode::Strict => {
                    return Err(BlochError::invalid_circuit(format!(
                        "unrecognized gate token '{}'",
                        raw
                    )));
                }
                ParseMode::Permissive => {
                    debug!(token = raw, "skipping unrecognized gate token");
                }
            },
        }
    }
    Ok(circuit)
}

/// `Ok(None)` for an unknown token, `Err` for a malformed rotation.
fn parse_token(raw: &str) -> Result<Option<Gate>> {
    let token = raw.to_ascii_uppercase();
    let gate = match token.as_str() {
        "H" => Gate::H,
        "X" => Gate::X,
        "Y" => Gate::Y,
        "Z" => Gate::Z,
        "S" => Gate::S,
        "T" => Gate::T,
        _ => {
            let Some(prefix) = token.get(..3) else {
                return Ok(None);
            };
            if !matches!(prefix, "RX(" | "RY(" | "RZ(") {
                return Ok(None);
            }
            let theta = parse_angle(raw, &token[3..])?;
            match prefix {
                "RX(" => Gate::RX(theta),
                "RY(" => Gate::RY(theta),
                _ => Gate::RZ(theta),
            }
        }
    };
    Ok(Some(gate))
}

fn parse_angle(raw: &str, rest: &str) -> Result<f64> {
    let inner = rest.strip_suffix(')').ok_or_else(|| {
        BlochError::invalid_circuit(format!("missing ')' in rotation token '{}'", raw))
    })?;
    let theta: f64 = inner.trim().parse().map_err(|_| {
        BlochError::invalid_circuit(format!("malformed angle '{}' in token '{}'", inner, raw))
    })?;
    if !theta.is_finite() {
        return Err(BlochError::invalid_circuit(format!(
            "angle in token '{}' is not a finite number",
            raw
        )));
    }
    Ok(theta)
}
