// src/circuits/qasm.rs

//! A constrained interpreter for the OpenQASM 2.0 subset needed to describe
//! multi-qubit circuits.
//!
//! Nothing here executes user code. The interpreter recognizes a closed set
//! of statements:
//!
//! - `OPENQASM 2.0;` and `include "qelib1.inc";` (accepted, no file access)
//! - `qreg name[n];` and `creg name[n];`
//! - gate applications such as `h q[0];`, `cx q[0],q[1];`, `rz(pi/4) q;`
//! - `measure q[i] -> c[j];` and `barrier q;`
//!
//! Gate angles accept numbers, `pi`, `+ - * /`, unary minus and parentheses.
//! Whole-register operands broadcast the gate over the register. Qubits of
//! several `qreg` declarations are laid out in declaration order.

use super::{Circuit, ParseMode};
use crate::core::{BlochError, Result};
use crate::operations::{Gate, Operation};
use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::Range;
use tracing::debug;

/// Interprets `source` and returns the circuit it describes.
///
/// `expected_qubits`, when given, must equal the total size of the declared
/// quantum registers. `max_qubits`, when given, is enforced at each `qreg`
/// statement, before any gate is broadcast over the oversized register.
///
/// # Errors
/// `InvalidCircuit` for syntax errors, unsupported statements, undeclared or
/// out-of-range registers, register sizes above `max_qubits` or beyond
/// `usize`, wrong parameter counts, malformed angles, and (in
/// [`ParseMode::Strict`]) unknown gate names.
pub fn parse_qasm(
    source: &str,
    mode: ParseMode,
    expected_qubits: Option<usize>,
    max_qubits: Option<usize>,
) -> Result<Circuit> {
    let mut interpreter = Interpreter::new(mode, max_qubits);
    for (line, statement) in split_statements(source) {
        interpreter
            .statement(&statement)
            .map_err(|err| at_line(err, line))?;
    }
    interpreter.finish(expected_qubits)
}

#[derive(Debug)]
struct Register {
    name: String,
    offset: usize,
    size: usize,
}

impl Register {
    /// One past the last flat index. `declare` guarantees this fits in `usize`.
    fn end(&self) -> usize {
        self.offset + self.size
    }
}

struct Interpreter {
    mode: ParseMode,
    max_qubits: Option<usize>,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    operations: Vec<Operation>,
}

impl Interpreter {
    fn new(mode: ParseMode, max_qubits: Option<usize>) -> Self {
        Self {
            mode,
            max_qubits,
            qregs: Vec::new(),
            cregs: Vec::new(),
            operations: Vec::new(),
        }
    }

    fn num_qubits(&self) -> usize {
        self.qregs.last().map_or(0, Register::end)
    }

    fn num_clbits(&self) -> usize {
        self.cregs.last().map_or(0, Register::end)
    }

    fn statement(&mut self, statement: &str) -> Result<()> {
        let (keyword, rest) = split_keyword(statement);
        match keyword {
            "OPENQASM" => {
                if !rest.trim().starts_with('2') {
                    return Err(invalid(format!("unsupported OpenQASM version '{}'", rest.trim())));
                }
                Ok(())
            }
            "include" => {
                let file = rest.trim().trim_matches('"');
                if file != "qelib1.inc" {
                    return Err(invalid(format!("include of '{}' is not supported", file)));
                }
                Ok(())
            }
            "qreg" => {
                let register = self.declare(rest, self.num_qubits())?;
                if let Some(max) = self.max_qubits {
                    if register.end() > max {
                        return Err(invalid(format!(
                            "register '{}' brings the program to {} qubits, more than the configured maximum of {}",
                            register.name,
                            register.end(),
                            max
                        )));
                    }
                }
                self.qregs.push(register);
                Ok(())
            }
            "creg" => {
                let register = self.declare(rest, self.num_clbits())?;
                self.cregs.push(register);
                Ok(())
            }
            "measure" => self.measure(rest),
            "barrier" => {
                let mut qubits = Vec::new();
                for operand in split_top_level(rest, ',') {
                    qubits.extend(resolve(&self.qregs, operand.trim(), "qreg")?);
                }
                self.operations.push(Operation::Barrier { qubits });
                Ok(())
            }
            "gate" | "opaque" | "if" | "reset" => Err(invalid(format!(
                "'{}' statements are not supported",
                keyword
            ))),
            _ => self.gate_application(statement),
        }
    }

    fn declare(&self, rest: &str, offset: usize) -> Result<Register> {
        let (name, index) = parse_indexed(rest.trim())?;
        let size = index.ok_or_else(|| invalid(format!("register '{}' needs a size", name)))?;
        if size == 0 {
            return Err(invalid(format!("register '{}' must have at least one bit", name)));
        }
        if self.qregs.iter().chain(self.cregs.iter()).any(|r| r.name == name) {
            return Err(invalid(format!("register '{}' declared twice", name)));
        }
        if offset.checked_add(size).is_none() {
            return Err(invalid(format!(
                "register '{}' of size {} overflows the total register size",
                name, size
            )));
        }
        Ok(Register {
            name: name.to_string(),
            offset,
            size,
        })
    }

    fn measure(&mut self, rest: &str) -> Result<()> {
        let (source, target) = rest
            .split_once("->")
            .ok_or_else(|| invalid("measure needs the form 'measure q -> c'"))?;
        let qubits = resolve(&self.qregs, source.trim(), "qreg")?;
        let clbits = resolve(&self.cregs, target.trim(), "creg")?;
        if qubits.len() != clbits.len() {
            return Err(invalid(format!(
                "measure maps {} qubit(s) onto {} classical bit(s)",
                qubits.len(),
                clbits.len()
            )));
        }
        self.operations.extend(
            qubits
                .into_iter()
                .zip(clbits)
                .map(|(qubit, clbit)| Operation::Measure { qubit, clbit }),
        );
        Ok(())
    }

    fn gate_application(&mut self, statement: &str) -> Result<()> {
        let name_end = statement
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(statement.len());
        let name = &statement[..name_end];
        if name.is_empty() {
            return Err(invalid(format!("cannot parse statement '{}'", statement)));
        }
        let mut rest = statement[name_end..].trim_start();

        let mut params = Vec::new();
        if let Some(after_open) = rest.strip_prefix('(') {
            let close = matching_paren(after_open)
                .ok_or_else(|| invalid(format!("unbalanced parentheses in '{}'", statement)))?;
            for expr in split_top_level(&after_open[..close], ',') {
                params.push(evaluate(expr)?);
            }
            rest = after_open[close + 1..].trim_start();
        }

        let Some(gate) = lookup_gate(name, &params)? else {
            return match self.mode {
                ParseMode::Strict => Err(invalid(format!("unrecognized gate '{}'", name))),
                ParseMode::Permissive => {
                    debug!(gate = name, "skipping unrecognized gate");
                    Ok(())
                }
            };
        };

        let operands = split_top_level(rest, ',')
            .into_iter()
            .map(|operand| resolve(&self.qregs, operand.trim(), "qreg"))
            .collect::<Result<Vec<_>>>()?;
        if operands.len() != gate.arity() {
            return Err(invalid(format!(
                "gate '{}' expects {} operand(s), got {}",
                name,
                gate.arity(),
                operands.len()
            )));
        }

        // Broadcast: whole registers must agree in size, single qubits repeat.
        let width = operands.iter().map(|o| o.len()).max().unwrap_or(1);
        if operands.iter().any(|o| o.len() != 1 && o.len() != width) {
            return Err(invalid(format!("register sizes do not match in '{}'", statement)));
        }
        for i in 0..width {
            let qubits: Vec<usize> = operands
                .iter()
                .map(|o| if o.len() == 1 { o.start } else { o.start + i })
                .collect();
            self.operations.push(Operation::Gate { gate, qubits });
        }
        Ok(())
    }

    fn finish(self, expected_qubits: Option<usize>) -> Result<Circuit> {
        let num_qubits = self.num_qubits();
        if num_qubits == 0 {
            return Err(invalid("no quantum register declared"));
        }
        if let Some(expected) = expected_qubits {
            if expected != num_qubits {
                return Err(invalid(format!(
                    "program declares {} qubit(s) but {} were requested",
                    num_qubits, expected
                )));
            }
        }
        let mut circuit = Circuit::new(num_qubits);
        circuit.add_operations(self.operations)?;
        Ok(circuit)
    }
}

fn invalid(message: impl Into<String>) -> BlochError {
    BlochError::invalid_circuit(message)
}

fn at_line(err: BlochError, line: usize) -> BlochError {
    match err {
        BlochError::InvalidCircuit { message } => BlochError::InvalidCircuit {
            message: format!("line {}: {}", line, message),
        },
        other => other,
    }
}

/// Maps a gate name and its evaluated parameters onto the catalogue.
/// `Ok(None)` means the name is unknown.
fn lookup_gate(name: &str, params: &[f64]) -> Result<Option<Gate>> {
    let expect = |count: usize| -> Result<()> {
        if params.len() == count {
            Ok(())
        } else {
            Err(invalid(format!(
                "gate '{}' takes {} parameter(s), got {}",
                name,
                count,
                params.len()
            )))
        }
    };
    let gate = match name {
        "id" | "i" => expect(0).map(|_| Gate::I)?,
        "h" => expect(0).map(|_| Gate::H)?,
        "x" => expect(0).map(|_| Gate::X)?,
        "y" => expect(0).map(|_| Gate::Y)?,
        "z" => expect(0).map(|_| Gate::Z)?,
        "s" => expect(0).map(|_| Gate::S)?,
        "sdg" => expect(0).map(|_| Gate::Sdg)?,
        "t" => expect(0).map(|_| Gate::T)?,
        "tdg" => expect(0).map(|_| Gate::Tdg)?,
        "sx" => expect(0).map(|_| Gate::SX)?,
        "sxdg" => expect(0).map(|_| Gate::SXdg)?,
        "rx" => expect(1).map(|_| Gate::RX(params[0]))?,
        "ry" => expect(1).map(|_| Gate::RY(params[0]))?,
        "rz" => expect(1).map(|_| Gate::RZ(params[0]))?,
        "p" | "u1" => expect(1).map(|_| Gate::Phase(params[0]))?,
        "u2" => expect(2).map(|_| Gate::U(FRAC_PI_2, params[0], params[1]))?,
        "u" | "u3" | "U" => expect(3).map(|_| Gate::U(params[0], params[1], params[2]))?,
        "cx" | "CX" | "cnot" => expect(0).map(|_| Gate::CX)?,
        "cy" => expect(0).map(|_| Gate::CY)?,
        "cz" => expect(0).map(|_| Gate::CZ)?,
        "ch" => expect(0).map(|_| Gate::CH)?,
        "cp" | "cu1" => expect(1).map(|_| Gate::CPhase(params[0]))?,
        "crx" => expect(1).map(|_| Gate::CRX(params[0]))?,
        "cry" => expect(1).map(|_| Gate::CRY(params[0]))?,
        "crz" => expect(1).map(|_| Gate::CRZ(params[0]))?,
        "swap" => expect(0).map(|_| Gate::Swap)?,
        _ => return Ok(None),
    };
    Ok(Some(gate))
}

/// Resolves `name` or `name[i]` against a register table into a range of flat indices.
fn resolve(registers: &[Register], operand: &str, kind: &str) -> Result<Range<usize>> {
    let (name, index) = parse_indexed(operand)?;
    let register = registers
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| invalid(format!("{} '{}' is not declared", kind, name)))?;
    match index {
        Some(i) if i >= register.size => Err(invalid(format!(
            "index {} out of range for {} '{}' of size {}",
            i, kind, name, register.size
        ))),
        Some(i) => Ok(register.offset + i..register.offset + i + 1),
        None => Ok(register.offset..register.end()),
    }
}

/// Splits `name[idx]` into its parts; a bare `name` has no index.
fn parse_indexed(text: &str) -> Result<(&str, Option<usize>)> {
    let (name, index) = match text.split_once('[') {
        Some((name, tail)) => {
            let digits = tail
                .strip_suffix(']')
                .ok_or_else(|| invalid(format!("missing ']' in '{}'", text)))?;
            let index = digits
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid(format!("bad index '{}' in '{}'", digits, text)))?;
            (name.trim(), Some(index))
        }
        None => (text.trim(), None),
    };
    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name {
        return Err(invalid(format!("invalid identifier '{}'", name)));
    }
    Ok((name, index))
}

fn split_keyword(statement: &str) -> (&str, &str) {
    match statement.find(char::is_whitespace) {
        Some(pos) => (&statement[..pos], &statement[pos..]),
        None => (statement, ""),
    }
}

/// Strips `//` comments and splits on `;`, keeping the line each statement starts on.
fn split_statements(source: &str) -> Vec<(usize, String)> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut start_line = 1;
    for (line_no, line) in source.lines().enumerate() {
        let code = line.split("//").next().unwrap_or("");
        for c in code.chars() {
            if c == ';' {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    statements.push((start_line, trimmed.to_string()));
                }
                current.clear();
            } else {
                if current.trim().is_empty() && !c.is_whitespace() {
                    start_line = line_no + 1;
                }
                current.push(c);
            }
        }
        current.push(' ');
    }
    let trailing = current.trim();
    if !trailing.is_empty() {
        statements.push((start_line, trailing.to_string()));
    }
    statements
}

/// Splits on `sep` outside parentheses; empty input yields no parts.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte offset of the `)` closing an already-consumed `(`.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

//-------------------------------------------------------------------------
// Angle expressions
//-------------------------------------------------------------------------

/// Evaluates an angle expression: numbers, `pi`, `+ - * /`, unary signs, parentheses.
pub fn evaluate(expr: &str) -> Result<f64> {
    let mut parser = ExprParser {
        chars: expr.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        source: expr,
    };
    let value = parser.expr()?;
    if parser.pos != parser.chars.len() {
        return Err(parser.error());
    }
    if !value.is_finite() {
        return Err(invalid(format!("angle '{}' is not a finite number", expr.trim())));
    }
    Ok(value)
}

struct ExprParser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error(&self) -> BlochError {
        invalid(format!("malformed angle expression '{}'", self.source.trim()))
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.pos += 1;
                self.factor()
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek() != Some(')') {
                    return Err(self.error());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                    self.pos += 1;
                }
                let ident: String = self.chars[start..self.pos].iter().collect();
                if ident == "pi" {
                    Ok(PI)
                } else {
                    Err(invalid(format!("unknown identifier '{}' in angle", ident)))
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            _ => Err(self.error()),
        }
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal.parse::<f64>().map_err(|_| self.error())
    }
}
