// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for grid construction, solver input validation, and GPU
//! device setup.
//!
//! Every validation failure is reported synchronously at the point of
//! violation, before any persistent state is touched. Callers can
//! pattern-match on failure modes rather than parsing opaque strings.

use std::fmt;

/// Errors arising from input validation or GPU initialization.
#[derive(Debug)]
pub enum EntrogravError {
    /// Grid size outside the supported range `1..=256`.
    GridSize(usize),

    /// Domain size was not a positive finite number.
    DomainSize(f64),

    /// Solver iteration count outside `1..=10000`.
    Iterations(usize),

    /// Evolution step count outside `1..=5000`.
    TimeSteps(usize),

    /// Time step was not positive, not finite, or above the 1000 s cap.
    TimeStep(f64),

    /// A supplied field does not match the grid resolution.
    ShapeMismatch {
        /// Which input field mismatched (e.g. "mass distribution").
        field: &'static str,
        /// Per-axis resolution of the supplied field.
        got: usize,
        /// Grid resolution the field must match.
        expected: usize,
    },

    /// No compatible GPU adapter was found by wgpu.
    NoAdapter,

    /// GPU lacks the `SHADER_F64` feature required for f64 compute.
    NoShaderF64,

    /// GPU device creation or dispatch failed (wraps the wgpu message).
    DeviceCreation(String),
}

impl fmt::Display for EntrogravError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridSize(n) => {
                write!(f, "Grid size {n} must be in 1..=256")
            }
            Self::DomainSize(l) => {
                write!(f, "Domain size {l} must be a positive number")
            }
            Self::Iterations(k) => {
                write!(f, "Iterations {k} must be in 1..=10000")
            }
            Self::TimeSteps(k) => {
                write!(f, "Time steps {k} must be in 1..=5000")
            }
            Self::TimeStep(dt) => {
                write!(f, "Time step {dt} must be positive and at most 1000 s")
            }
            Self::ShapeMismatch {
                field,
                got,
                expected,
            } => {
                write!(
                    f,
                    "{field} shape ({got}, {got}, {got}) must match grid size \
                     ({expected}, {expected}, {expected})"
                )
            }
            Self::NoAdapter => write!(f, "No GPU adapter found"),
            Self::NoShaderF64 => {
                write!(
                    f,
                    "GPU does not support SHADER_F64 — cannot run f64 computation"
                )
            }
            Self::DeviceCreation(e) => write!(f, "Failed to create GPU device: {e}"),
        }
    }
}

impl std::error::Error for EntrogravError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_grid_size() {
        let err = EntrogravError::GridSize(257);
        assert_eq!(err.to_string(), "Grid size 257 must be in 1..=256");
    }

    #[test]
    fn display_shape_mismatch() {
        let err = EntrogravError::ShapeMismatch {
            field: "mass distribution",
            got: 16,
            expected: 32,
        };
        assert_eq!(
            err.to_string(),
            "mass distribution shape (16, 16, 16) must match grid size (32, 32, 32)"
        );
    }

    #[test]
    fn display_no_adapter() {
        let err = EntrogravError::NoAdapter;
        assert_eq!(err.to_string(), "No GPU adapter found");
    }

    #[test]
    fn display_iterations() {
        let err = EntrogravError::Iterations(0);
        assert_eq!(err.to_string(), "Iterations 0 must be in 1..=10000");
    }

    #[test]
    fn error_trait_object() {
        let err: Box<dyn std::error::Error> = Box::new(EntrogravError::NoShaderF64);
        assert!(err.to_string().contains("SHADER_F64"));
    }
}
