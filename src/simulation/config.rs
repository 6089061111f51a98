// src/simulation/config.rs
use crate::circuits::ParseMode;
use crate::core::constants::bloch_constants::{
    DEFAULT_MAX_QUBITS, HERMITIAN_TOLERANCE, MAX_QUBITS_CEILING, NORM_TOLERANCE,
};
use crate::core::{BlochError, Result};
use serde::{Deserialize, Serialize};

/// Tunables for a [`super::Simulator`].
///
/// Missing keys take their defaults, so an empty TOML document is a valid
/// configuration:
///
/// ```
/// use blochpath::simulation::SimulatorConfig;
///
/// let config = SimulatorConfig::from_toml_str("parse_mode = \"strict\"\nmax_qubits = 4").unwrap();
/// assert_eq!(config.max_qubits, 4);
/// assert!(config.validate_snapshots);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Treatment of unknown gate names in token strings and QASM.
    pub parse_mode: ParseMode,
    /// Allowed |‖ψ‖² − 1| for supplied and produced states.
    pub norm_tolerance: f64,
    /// Allowed Hermiticity deviation and imaginary residue of expectation values.
    pub hermitian_tolerance: f64,
    /// Largest register accepted. Density operators grow as 4^n.
    pub max_qubits: usize,
    /// Check every snapshot's norm and density-operator invariants.
    pub validate_snapshots: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::default(),
            norm_tolerance: NORM_TOLERANCE,
            hermitian_tolerance: HERMITIAN_TOLERANCE,
            max_qubits: DEFAULT_MAX_QUBITS,
            validate_snapshots: true,
        }
    }
}

impl SimulatorConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SimulatorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects non-positive or non-finite tolerances and a `max_qubits`
    /// outside `1..=MAX_QUBITS_CEILING` (12).
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("norm_tolerance", self.norm_tolerance),
            ("hermitian_tolerance", self.hermitian_tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BlochError::Config {
                    message: format!("{} must be a positive number, got {}", name, value),
                });
            }
        }
        if self.max_qubits == 0 || self.max_qubits > MAX_QUBITS_CEILING {
            return Err(BlochError::Config {
                message: format!(
                    "max_qubits must be between 1 and {}, got {}",
                    MAX_QUBITS_CEILING, self.max_qubits
                ),
            });
        }
        Ok(())
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn with_norm_tolerance(mut self, tolerance: f64) -> Self {
        self.norm_tolerance = tolerance;
        self
    }

    pub fn with_hermitian_tolerance(mut self, tolerance: f64) -> Self {
        self.hermitian_tolerance = tolerance;
        self
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn with_snapshot_validation(mut self, enabled: bool) -> Self {
        self.validate_snapshots = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.parse_mode, ParseMode::Permissive);
        assert_eq!(config.max_qubits, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() -> Result<()> {
        assert_eq!(SimulatorConfig::from_toml_str("")?, SimulatorConfig::default());
        Ok(())
    }

    #[test]
    fn test_toml_overrides() -> Result<()> {
        let config = SimulatorConfig::from_toml_str(
            r#"
            parse_mode = "strict"
            norm_tolerance = 1e-6
            validate_snapshots = false
            "#,
        )?;
        assert_eq!(config.parse_mode, ParseMode::Strict);
        assert_eq!(config.norm_tolerance, 1e-6);
        assert!(!config.validate_snapshots);
        assert_eq!(config.hermitian_tolerance, HERMITIAN_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for source in [
            "max_qubits = 0",
            "max_qubits = 13",
            "norm_tolerance = -1.0",
            "hermitian_tolerance = 0.0",
            "parse_mode = \"lenient\"",
            "max_qubits = \"ten\"",
        ] {
            let err = SimulatorConfig::from_toml_str(source).unwrap_err();
            assert!(matches!(err, BlochError::Config { .. }), "{}: {:?}", source, err);
        }
    }

    #[test]
    fn test_max_qubits_ceiling() -> Result<()> {
        let config = SimulatorConfig::from_toml_str("max_qubits = 12")?;
        assert_eq!(config.max_qubits, MAX_QUBITS_CEILING);
        assert!(SimulatorConfig::default().with_max_qubits(13).validate().is_err());
        Ok(())
    }

    #[test]
    fn test_builder_setters() {
        let config = SimulatorConfig::default()
            .with_parse_mode(ParseMode::Strict)
            .with_max_qubits(3)
            .with_norm_tolerance(1e-6)
            .with_hermitian_tolerance(1e-7)
            .with_snapshot_validation(false);
        assert_eq!(config.max_qubits, 3);
        assert_eq!(config.hermitian_tolerance, 1e-7);
        assert!(config.validate().is_ok());
    }
}
