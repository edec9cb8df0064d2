// SPDX-License-Identifier: AGPL-3.0-only

//! Compute backend seam.
//!
//! The solver touches a backend in exactly two places — the scaled
//! Laplacian behind the quantum pressure, and the fused
//! damped-update-with-clamp on g₀₀ — so the trait carries exactly those
//! two operations and the same algorithm runs on the CPU reference
//! backend or on a GPU implementation without changing a line of solver
//! code. Backends must produce equivalent numeric results (see
//! `tolerances::GPU_VS_CPU_F64` for the accepted cross-backend spread).

use crate::constants::CausalityBounds;
use crate::error::EntrogravError;
use crate::field::{MetricField, ScalarField};
use crate::stencil;

/// Dense-array operations the solver needs from an execution backend.
///
/// Operations are fallible because accelerated backends can lose the
/// device mid-dispatch; the CPU reference backend never fails.
pub trait Backend {
    /// Human-readable backend name for reports.
    fn name(&self) -> &'static str;

    /// `scale · ∇²field` with the axis-matched double-gradient Laplacian.
    ///
    /// # Errors
    ///
    /// Backend execution failure (device loss, readback).
    fn scaled_laplacian(
        &self,
        field: &ScalarField,
        dx: f64,
        scale: f64,
    ) -> Result<ScalarField, EntrogravError>;

    /// Apply `iterations` damped updates to the g₀₀ component:
    /// `g₀₀ += damping · update`, clamping into `bounds` after every
    /// single iteration. Cells are independent, so the per-cell repeat
    /// is equivalent to repeating the full-grid sweep.
    ///
    /// # Errors
    ///
    /// Backend execution failure; the metric is untouched on error.
    fn damped_update_g00(
        &self,
        metric: &mut MetricField,
        update: &ScalarField,
        damping: f64,
        iterations: usize,
        bounds: CausalityBounds,
    ) -> Result<(), EntrogravError>;
}

/// Single-threaded CPU reference backend.
///
/// This is the semantic definition of every operation; other backends are
/// validated against it.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

impl Backend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn scaled_laplacian(
        &self,
        field: &ScalarField,
        dx: f64,
        scale: f64,
    ) -> Result<ScalarField, EntrogravError> {
        let mut lap = stencil::laplacian(field, dx);
        for v in lap.as_mut_slice() {
            *v *= scale;
        }
        Ok(lap)
    }

    fn damped_update_g00(
        &self,
        metric: &mut MetricField,
        update: &ScalarField,
        damping: f64,
        iterations: usize,
        bounds: CausalityBounds,
    ) -> Result<(), EntrogravError> {
        let n = metric.n();
        let cells = n * n * n;
        let data = metric.as_mut_slice();
        let u = update.as_slice();
        for cell in 0..cells {
            let step = damping * u[cell];
            let g = &mut data[cell * 16];
            for _ in 0..iterations {
                *g = bounds.clamp(*g + step);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerances::EXACT_F64;

    #[test]
    fn cpu_laplacian_matches_stencil_exactly() {
        let f = ScalarField::from_fn(6, |i, j, k| ((i * i) + 2 * j * k) as f64);
        let b = CpuBackend;
        let a = b.scaled_laplacian(&f, 0.5, 1.0).unwrap();
        let s = stencil::laplacian(&f, 0.5);
        assert_eq!(a.as_slice(), s.as_slice());
    }

    #[test]
    fn scaled_laplacian_applies_scale() {
        let f = ScalarField::from_fn(8, |i, _, _| (i * i) as f64);
        let b = CpuBackend;
        let unscaled = b.scaled_laplacian(&f, 1.0, 1.0).unwrap();
        let scaled = b.scaled_laplacian(&f, 1.0, 2.5).unwrap();
        for (u, s) in unscaled.as_slice().iter().zip(scaled.as_slice()) {
            assert!((s - 2.5 * u).abs() < EXACT_F64);
        }
    }

    #[test]
    fn damped_update_clamps_every_iteration() {
        let mut m = MetricField::background(2);
        let update = ScalarField::uniform(2, 1000.0);
        let b = CpuBackend;
        b.damped_update_g00(&mut m, &update, 0.01, 7, CausalityBounds::default())
            .unwrap();
        // One step of +10 already saturates the upper bound; further
        // iterations stay pinned there.
        for i in 0..2 {
            assert!((m.g00(i, 0, 0) - 10.0).abs() < EXACT_F64);
        }
    }

    #[test]
    fn damped_update_accumulates_below_bounds() {
        let mut m = MetricField::background(2);
        let update = ScalarField::uniform(2, 10.0);
        let b = CpuBackend;
        b.damped_update_g00(&mut m, &update, 0.01, 3, CausalityBounds::default())
            .unwrap();
        // 1.0 + 3 · 0.1, never touching a bound
        assert!((m.g00(1, 1, 1) - 1.3).abs() < EXACT_F64);
    }
}
