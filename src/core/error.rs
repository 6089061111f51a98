//! Error handling logic

use thiserror::Error;

/// Result type alias for simulation and observable operations.
pub type Result<T> = std::result::Result<T, BlochError>;

/// Error types raised by circuit parsing, state evolution and observable extraction.
///
/// The engine never handles these internally; they are propagated to the caller,
/// which decides how to report them (see [`BlochError::is_client_error`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlochError {
    /// The circuit description is malformed: unknown gate (in strict mode),
    /// out-of-range or duplicated qubit index, or an unparseable angle.
    #[error("Invalid Circuit: {message}")]
    InvalidCircuit {
        /// Which validation failed
        message: String,
    },

    /// An operator does not have the dimensions an operation requires,
    /// e.g. Bloch extraction on anything other than a 2x2 operator.
    #[error("Shape Mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    ShapeMismatch {
        /// Required (rows, cols)
        expected: (usize, usize),
        /// Encountered (rows, cols)
        actual: (usize, usize),
    },

    /// A numeric invariant was violated where it is required to hold:
    /// non-unit norm, non-Hermitian operator, trace away from 1.
    /// Surfaced as-is, never silently corrected.
    #[error("Numeric Anomaly: {message}")]
    NumericAnomaly {
        /// Description of the violated invariant
        message: String,
    },

    /// The simulator configuration could not be parsed or holds invalid values.
    #[error("Configuration Error: {message}")]
    Config {
        /// Config failure message
        message: String,
    },

    /// A request body could not be decoded or a response could not be encoded.
    #[error("Serialization Error: {message}")]
    Serialization {
        /// Serialization failure message
        message: String,
    },
}

impl BlochError {
    /// Shorthand for [`BlochError::InvalidCircuit`].
    pub fn invalid_circuit(message: impl Into<String>) -> Self {
        Self::InvalidCircuit { message: message.into() }
    }

    /// Shorthand for [`BlochError::NumericAnomaly`].
    pub fn numeric_anomaly(message: impl Into<String>) -> Self {
        Self::NumericAnomaly { message: message.into() }
    }

    /// Shorthand for [`BlochError::ShapeMismatch`].
    pub fn shape_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Whether the failure was caused by the request rather than by the engine.
    ///
    /// Invalid circuits, shape mismatches and undecodable request bodies map to
    /// client errors; numeric anomalies and configuration faults are server-side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BlochError::InvalidCircuit { .. }
                | BlochError::ShapeMismatch { .. }
                | BlochError::Serialization { .. }
        )
    }
}

impl From<serde_json::Error> for BlochError {
    fn from(err: serde_json::Error) -> Self {
        BlochError::Serialization { message: err.to_string() }
    }
}

impl From<toml::de::Error> for BlochError {
    fn from(err: toml::de::Error) -> Self {
        BlochError::Config { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlochError::invalid_circuit("qubit index 3 out of range for 2 qubits");
        assert_eq!(err.to_string(), "Invalid Circuit: qubit index 3 out of range for 2 qubits");

        let err = BlochError::shape_mismatch((2, 2), (4, 4));
        assert_eq!(err.to_string(), "Shape Mismatch: expected 2x2, got 4x4");

        let err = BlochError::numeric_anomaly("trace = 0.5");
        assert!(err.to_string().contains("trace = 0.5"));
    }

    #[test]
    fn test_client_error_mapping() {
        assert!(BlochError::invalid_circuit("x").is_client_error());
        assert!(BlochError::shape_mismatch((2, 2), (1, 1)).is_client_error());
        assert!(!BlochError::numeric_anomaly("x").is_client_error());
        assert!(!BlochError::Config { message: "x".into() }.is_client_error());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: BlochError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, BlochError::Serialization { .. }));
    }
}
