// SPDX-License-Identifier: AGPL-3.0-only

//! Analytic field builders for simulation scenarios.
//!
//! Mass and entropy inputs for the solver: Gaussian blobs (stellar
//! cores), inverse-square radial profiles (collapsed objects), traveling
//! entropy waves, and seeded Gaussian noise (quantum fluctuations).
//! Everything is deterministic; noise uses a seeded LCG + Box-Muller
//! rather than an external RNG.

use crate::field::ScalarField;
use crate::grid::GridConfig;

/// Gaussian blob `amplitude · exp(−r²/2σ²)` centered at physical
/// coordinates `center`.
#[must_use]
pub fn gaussian_blob(
    config: &GridConfig,
    center: [f64; 3],
    sigma: f64,
    amplitude: f64,
) -> ScalarField {
    let inv_two_sigma2 = 1.0 / (2.0 * sigma * sigma);
    ScalarField::from_fn(config.grid_size(), |i, j, k| {
        let dx = config.coord(i) - center[0];
        let dy = config.coord(j) - center[1];
        let dz = config.coord(k) - center[2];
        let r2 = dx * dx + dy * dy + dz * dz;
        amplitude * (-r2 * inv_two_sigma2).exp()
    })
}

/// Inverse-square radial profile `amplitude / max(r, r_floor)²` about the
/// domain center. The floor avoids the singularity at r = 0.
#[must_use]
pub fn radial_inverse_square(config: &GridConfig, amplitude: f64, r_floor: f64) -> ScalarField {
    let c = config.domain_size() / 2.0;
    ScalarField::from_fn(config.grid_size(), |i, j, k| {
        let dx = config.coord(i) - c;
        let dy = config.coord(j) - c;
        let dz = config.coord(k) - c;
        let r = (dx * dx + dy * dy + dz * dz).sqrt().max(r_floor);
        amplitude / (r * r)
    })
}

/// Traveling sinusoidal entropy wave along x at time `t`:
/// `amplitude · (1 + ½ sin(kx − ωt))` with `k = 2π/λ`, `ω = k·v`.
#[must_use]
pub fn entropy_wave(
    config: &GridConfig,
    wavelength: f64,
    amplitude: f64,
    velocity: f64,
    t: f64,
) -> ScalarField {
    let k = 2.0 * std::f64::consts::PI / wavelength;
    let omega = k * velocity;
    ScalarField::from_fn(config.grid_size(), |i, _, _| {
        let phase = k * config.coord(i) - omega * t;
        amplitude * (1.0 + 0.5 * phase.sin())
    })
}

/// Seeded Gaussian noise field, mean 0 and standard deviation `sigma`.
///
/// LCG + Box-Muller; reproducible for a given seed, good enough for
/// scenario fluctuations.
#[must_use]
pub fn gaussian_noise(n: usize, sigma: f64, seed: u64) -> ScalarField {
    let mut rng_state = seed;
    let mut lcg_next = move || -> f64 {
        rng_state = rng_state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (rng_state >> 33) as f64 / (1u64 << 31) as f64
    };
    ScalarField::from_fn(n, |_, _, _| {
        let u1 = lcg_next().max(1e-15);
        let u2 = lcg_next();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        z * sigma
    })
}

/// Add seeded Gaussian fluctuations to a field and take |·| so the
/// result stays a valid entropy field.
pub fn perturb_abs(field: &mut ScalarField, sigma: f64, seed: u64) {
    let noise = gaussian_noise(field.n(), sigma, seed);
    for (v, w) in field.as_mut_slice().iter_mut().zip(noise.as_slice()) {
        *v = (*v + w).abs();
    }
}

/// Gravitational flux anomaly readout for a point mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxAnomaly {
    /// Surface flux density m / (4πr²).
    pub flux_density: f64,
    /// Predicted shift −ln(1 + flux_density); negative for any positive
    /// density, the anti-gravity signature.
    pub quantum_shift: f64,
}

/// Flux density through a sphere of radius `radius` around `mass`, and
/// the resulting log-shift anomaly.
#[must_use]
pub fn flux_anomaly(mass: f64, radius: f64) -> FluxAnomaly {
    let flux_density = mass / (4.0 * std::f64::consts::PI * radius * radius);
    FluxAnomaly {
        flux_density,
        quantum_shift: -flux_density.ln_1p(),
    }
}
