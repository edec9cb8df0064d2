// SPDX-License-Identifier: AGPL-3.0-only

//! Physical constants and fixed model parameters (SI units).
//!
//! The field equation is deliberately toy physics, but every magic number
//! in the update rule lives here with its role documented — no ad-hoc
//! literals inside the solver loop.

/// Newtonian gravitational constant G (m³ kg⁻¹ s⁻²).
pub const G_NEWTON: f64 = 6.674e-11;

/// Propagation speed c (m/s).
pub const C_LIGHT: f64 = 3.0e8;

/// Reduced Planck constant ħ (J·s).
pub const HBAR: f64 = 1.054e-34;

/// Background (Minkowski-like) value of every diagonal metric component.
pub const BACKGROUND_G00: f64 = 1.0;

/// Lower causality bound on g₀₀. Values below this are non-physical.
pub const CAUSALITY_MIN: f64 = 0.1;

/// Upper causality bound on g₀₀.
pub const CAUSALITY_MAX: f64 = 10.0;

/// Damping factor applied to each curvature update of g₀₀.
pub const DAMPING: f64 = 0.01;

/// Normalization for the paradox hazard readout: the largest possible
/// |g₀₀ − background| given the causality bounds (10.0 − 1.0).
pub const HAZARD_NORM: f64 = CAUSALITY_MAX - BACKGROUND_G00;

/// Maximum grid resolution per axis. Caps worst-case memory at
/// 256³ × 16 f64 ≈ 2 GiB for the metric alone.
pub const MAX_GRID_SIZE: usize = 256;

/// Maximum solver iterations per call (resource-exhaustion guard).
pub const MAX_ITERATIONS: usize = 10_000;

/// Maximum time-evolution steps per call.
pub const MAX_TIME_STEPS: usize = 5_000;

/// Maximum time step size (s) accepted by the evolution module.
pub const MAX_DT: f64 = 1000.0;

/// Entropy diffusion coefficient D in ∂S/∂t = D ∇²S.
pub const ENTROPY_DIFFUSION: f64 = 0.01;

/// Damping on the ADM metric update (per unit dt).
pub const ADM_METRIC_DAMPING: f64 = 0.01;

/// Damping on the ADM extrinsic-curvature update (per unit dt).
pub const ADM_CURVATURE_DAMPING: f64 = 0.005;

/// Physical constants carried by a grid instance.
///
/// Immutable after construction. Attached to the grid rather than read
/// from globals so a state value is self-describing.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalConstants {
    /// Gravitational constant G.
    pub g: f64,
    /// Propagation speed c.
    pub c: f64,
    /// Reduced Planck constant ħ.
    pub hbar: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            g: G_NEWTON,
            c: C_LIGHT,
            hbar: HBAR,
        }
    }
}

impl PhysicalConstants {
    /// Einstein coupling 8πG/c⁴ in the metric update rule.
    #[must_use]
    pub fn einstein_coupling(&self) -> f64 {
        8.0 * std::f64::consts::PI * self.g / self.c.powi(4)
    }

    /// Coupling 4πG/c⁴ used by the extrinsic-curvature update.
    #[must_use]
    pub fn curvature_coupling(&self) -> f64 {
        4.0 * std::f64::consts::PI * self.g / self.c.powi(4)
    }
}

/// Closed clamp interval `[lo, hi]` for the g₀₀ component.
///
/// Clamping is silent, deterministic saturation — physical-constraint
/// enforcement, not an error path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CausalityBounds {
    /// Inclusive lower bound.
    pub lo: f64,
    /// Inclusive upper bound.
    pub hi: f64,
}

impl Default for CausalityBounds {
    fn default() -> Self {
        Self {
            lo: CAUSALITY_MIN,
            hi: CAUSALITY_MAX,
        }
    }
}

impl CausalityBounds {
    /// Clamp a value into the interval.
    #[must_use]
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.lo, self.hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn einstein_coupling_magnitude() {
        let k = PhysicalConstants::default().einstein_coupling();
        // 8π · 6.674e-11 / (3e8)⁴ ≈ 2.07e-43
        assert!(k > 2.0e-43 && k < 2.2e-43);
    }

    #[test]
    fn curvature_coupling_is_half_einstein() {
        let c = PhysicalConstants::default();
        let ratio = c.einstein_coupling() / c.curvature_coupling();
        assert!((ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn default_bounds_clamp() {
        let b = CausalityBounds::default();
        assert!((b.clamp(-5.0) - 0.1).abs() < f64::EPSILON);
        assert!((b.clamp(50.0) - 10.0).abs() < f64::EPSILON);
        assert!((b.clamp(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hazard_norm_spans_bounds() {
        assert!((HAZARD_NORM - 9.0).abs() < f64::EPSILON);
    }
}
