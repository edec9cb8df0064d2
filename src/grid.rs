// SPDX-License-Identifier: AGPL-3.0-only

//! Grid geometry and live solver state.
//!
//! `GridConfig` validates and freezes the geometry; `GridState` owns the
//! config, the physical constants, the causality bounds, and the metric
//! tensor the solver mutates in place. The state object has no mutating
//! methods of its own — the solver functions in [`crate::solver`] are the
//! single writer.

use crate::constants::{CausalityBounds, PhysicalConstants, MAX_GRID_SIZE};
use crate::error::EntrogravError;
use crate::field::{MetricField, ScalarField};

/// Validated, immutable grid geometry.
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    grid_size: usize,
    domain_size: f64,
    dx: f64,
}

impl GridConfig {
    /// Validate and derive the grid spacing.
    ///
    /// # Errors
    ///
    /// [`EntrogravError::GridSize`] if `grid_size ∉ 1..=256`;
    /// [`EntrogravError::DomainSize`] if `domain_size` is not a positive
    /// finite number.
    pub fn new(grid_size: usize, domain_size: f64) -> Result<Self, EntrogravError> {
        if grid_size == 0 || grid_size > MAX_GRID_SIZE {
            return Err(EntrogravError::GridSize(grid_size));
        }
        if !domain_size.is_finite() || domain_size <= 0.0 {
            return Err(EntrogravError::DomainSize(domain_size));
        }
        Ok(Self {
            grid_size,
            domain_size,
            dx: domain_size / grid_size as f64,
        })
    }

    /// Grid resolution N per axis.
    #[must_use]
    pub const fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Physical domain extent L (m).
    #[must_use]
    pub const fn domain_size(&self) -> f64 {
        self.domain_size
    }

    /// Grid spacing dx = L/N (m).
    #[must_use]
    pub const fn dx(&self) -> f64 {
        self.dx
    }

    /// Physical coordinate of grid index `i` along any axis.
    #[must_use]
    pub fn coord(&self, i: usize) -> f64 {
        i as f64 * self.dx
    }

    /// Check that a caller-supplied field matches this grid's resolution.
    ///
    /// # Errors
    ///
    /// [`EntrogravError::ShapeMismatch`] naming the offending field.
    pub fn check_shape(
        &self,
        field: &ScalarField,
        name: &'static str,
    ) -> Result<(), EntrogravError> {
        if field.n() == self.grid_size {
            Ok(())
        } else {
            Err(EntrogravError::ShapeMismatch {
                field: name,
                got: field.n(),
                expected: self.grid_size,
            })
        }
    }
}

/// Owner of the grid geometry, constants, and the live metric tensor.
#[derive(Debug, Clone)]
pub struct GridState {
    /// Frozen grid geometry.
    pub config: GridConfig,
    /// Physical constants for this instance.
    pub constants: PhysicalConstants,
    /// Clamp interval for g₀₀.
    pub bounds: CausalityBounds,
    /// The metric tensor, mutated in place by the solver.
    pub metric: MetricField,
}

impl GridState {
    /// Construct a grid in the flat background state.
    ///
    /// Allocates and initializes the metric only after validation
    /// succeeds — a failed construction performs no allocation.
    ///
    /// # Errors
    ///
    /// Propagates [`GridConfig::new`] validation failures.
    pub fn new(grid_size: usize, domain_size: f64) -> Result<Self, EntrogravError> {
        let config = GridConfig::new(grid_size, domain_size)?;
        Ok(Self {
            config,
            constants: PhysicalConstants::default(),
            bounds: CausalityBounds::default(),
            metric: MetricField::background(grid_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dx_is_exact_ratio() {
        let g = GridConfig::new(32, 10.0).unwrap();
        assert!((g.dx() - 10.0 / 32.0).abs() < f64::EPSILON);
        assert!((g.coord(16) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn bounds_of_grid_size() {
        assert!(GridConfig::new(1, 1.0).is_ok());
        assert!(GridConfig::new(256, 1.0).is_ok());
        assert!(matches!(
            GridConfig::new(0, 1.0),
            Err(EntrogravError::GridSize(0))
        ));
        assert!(matches!(
            GridConfig::new(257, 1.0),
            Err(EntrogravError::GridSize(257))
        ));
    }

    #[test]
    fn invalid_domain_size() {
        assert!(matches!(
            GridConfig::new(8, 0.0),
            Err(EntrogravError::DomainSize(_))
        ));
        assert!(matches!(
            GridConfig::new(8, -3.0),
            Err(EntrogravError::DomainSize(_))
        ));
        assert!(matches!(
            GridConfig::new(8, f64::NAN),
            Err(EntrogravError::DomainSize(_))
        ));
        assert!(matches!(
            GridConfig::new(8, f64::INFINITY),
            Err(EntrogravError::DomainSize(_))
        ));
    }

    #[test]
    fn construction_initializes_background_metric() {
        let state = GridState::new(4, 2.0).unwrap();
        for i in 0..4 {
            assert!((state.metric.at(i, i % 4, 0, 0, 0) - 1.0).abs() < f64::EPSILON);
        }
        assert!(state.metric.at(1, 2, 3, 0, 1).abs() < f64::EPSILON);
    }

    #[test]
    fn shape_check_names_field() {
        let g = GridConfig::new(8, 1.0).unwrap();
        let wrong = ScalarField::zeros(4);
        let err = g.check_shape(&wrong, "entropy map").unwrap_err();
        assert!(err.to_string().contains("entropy map"));
        assert!(g.check_shape(&ScalarField::zeros(8), "entropy map").is_ok());
    }
}
