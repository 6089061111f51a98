// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

pub use error::{BlochError, Result};
pub use state::StateVector;

pub mod constants;
pub use constants::bloch_constants::{
    ENTANGLEMENT_ENTROPY_THRESHOLD, ENTANGLEMENT_PURITY_THRESHOLD, EIGENVALUE_THRESHOLD,
    HERMITIAN_TOLERANCE, NORM_TOLERANCE, PURE_THRESHOLD,
};
