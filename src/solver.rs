// SPDX-License-Identifier: AGPL-3.0-only

//! Iterative metric field solver.
//!
//! Balances attractive mass-driven stress against the repulsive quantum
//! pressure derived from entropy curvature, updating the metric's g₀₀
//! component under damping with a causality clamp after every iteration.
//!
//! All validation happens before any array arithmetic: a failed call
//! leaves the grid state untouched.

use crate::backend::Backend;
use crate::constants::{BACKGROUND_G00, DAMPING, HAZARD_NORM, MAX_ITERATIONS};
use crate::error::EntrogravError;
use crate::field::{MetricField, ScalarField};
use crate::grid::GridState;

/// When the quantum pressure field is evaluated during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureSchedule {
    /// Evaluate once before the loop and reuse it. Canonical: the stress
    /// inputs are static for a single solve call.
    Precomputed,
    /// Re-evaluate every iteration. Numerically identical for static
    /// inputs; exists so callers evolving entropy externally can opt in
    /// explicitly instead of the solver guessing.
    PerIteration,
}

/// Solve configuration.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct SolveOptions {
    /// Number of damped update iterations (1..=10000).
    pub iterations: usize,
    /// Pressure evaluation schedule.
    pub schedule: PressureSchedule,
    /// Damping factor on each curvature update.
    pub damping: f64,
}

impl SolveOptions {
    /// Canonical options: precomputed pressure, default damping.
    pub const fn new(iterations: usize) -> Self {
        Self {
            iterations,
            schedule: PressureSchedule::Precomputed,
            damping: DAMPING,
        }
    }

    /// Switch the pressure schedule.
    pub const fn with_schedule(mut self, schedule: PressureSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// Repulsive quantum pressure: `(ħ·c / dx⁴) · ∇²S`.
///
/// Pure with respect to the entropy field; reads only dx, ħ, c from the
/// grid. Zero field in, zero field out; a uniform field yields pressure
/// within rounding of zero.
///
/// # Errors
///
/// [`EntrogravError::ShapeMismatch`] if the entropy field does not match
/// the grid resolution; backend execution failures pass through.
pub fn quantum_pressure(
    state: &GridState,
    entropy_field: &ScalarField,
    backend: &dyn Backend,
) -> Result<ScalarField, EntrogravError> {
    state.config.check_shape(entropy_field, "entropy map")?;
    let dx = state.config.dx();
    let scale = state.constants.hbar * state.constants.c / dx.powi(4);
    backend.scaled_laplacian(entropy_field, dx, scale)
}

/// Iterative solve of the modified field equation.
///
/// Per iteration, adds `damping · (8πG/c⁴) · (ρc² − P_quantum)` to the
/// g₀₀ component and clamps it into the grid's causality bounds. The
/// subtraction lets strong entropy curvature drive the net stress
/// negative. Mutates `state.metric` in place and returns a borrow of it;
/// deterministic for identical inputs.
///
/// # Errors
///
/// [`EntrogravError::Iterations`] when `iterations ∉ 1..=10000`;
/// [`EntrogravError::ShapeMismatch`] when either input field does not
/// match the grid. Validation failures leave the state untouched;
/// backend execution failures pass through.
pub fn solve_field_equations<'a>(
    state: &'a mut GridState,
    mass_distribution: &ScalarField,
    entropy_map: &ScalarField,
    options: &SolveOptions,
    backend: &dyn Backend,
) -> Result<&'a MetricField, EntrogravError> {
    if options.iterations == 0 || options.iterations > MAX_ITERATIONS {
        return Err(EntrogravError::Iterations(options.iterations));
    }
    state.config.check_shape(mass_distribution, "mass distribution")?;
    state.config.check_shape(entropy_map, "entropy map")?;

    let c2 = state.constants.c * state.constants.c;
    let coupling = state.constants.einstein_coupling();
    let n = state.config.grid_size();

    let curvature_update = move |pressure: &ScalarField| -> ScalarField {
        let mut update = ScalarField::zeros(n);
        let out = update.as_mut_slice();
        let mass = mass_distribution.as_slice();
        let p = pressure.as_slice();
        for i in 0..out.len() {
            out[i] = coupling * (mass[i] * c2 - p[i]);
        }
        update
    };

    match options.schedule {
        PressureSchedule::Precomputed => {
            let pressure = quantum_pressure(state, entropy_map, backend)?;
            let update = curvature_update(&pressure);
            backend.damped_update_g00(
                &mut state.metric,
                &update,
                options.damping,
                options.iterations,
                state.bounds,
            )?;
        }
        PressureSchedule::PerIteration => {
            for _ in 0..options.iterations {
                let pressure = quantum_pressure(state, entropy_map, backend)?;
                let update = curvature_update(&pressure);
                backend.damped_update_g00(
                    &mut state.metric,
                    &update,
                    options.damping,
                    1,
                    state.bounds,
                )?;
            }
        }
    }

    Ok(&state.metric)
}

/// Causality-paradox hazard readout in `[0, 1]`.
///
/// Maximum |g₀₀ − background| normalized by the widest deviation the
/// causality bounds permit (9.0). Exactly 0 for an untouched metric.
#[must_use]
pub fn paradox_hazard(state: &GridState) -> f64 {
    let n = state.metric.n();
    let cells = n * n * n;
    let data = state.metric.as_slice();
    let mut max_dev = 0.0_f64;
    for cell in 0..cells {
        max_dev = max_dev.max((data[cell * 16] - BACKGROUND_G00).abs());
    }
    (max_dev / HAZARD_NORM).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::tolerances::{EXACT_F64, SOLVER_STATIC, STENCIL_QUADRATIC_REL};

    fn grid(n: usize, l: f64) -> GridState {
        GridState::new(n, l).unwrap()
    }

    #[test]
    fn pressure_of_zero_entropy_is_zero() {
        let state = grid(8, 4.0);
        let p = quantum_pressure(&state, &ScalarField::zeros(8), &CpuBackend).unwrap();
        assert!(p.as_slice().iter().all(|v| v.abs() < EXACT_F64));
    }

    #[test]
    fn pressure_of_uniform_entropy_is_near_zero() {
        let state = grid(12, 6.0);
        let p = quantum_pressure(&state, &ScalarField::uniform(12, 5.0), &CpuBackend).unwrap();
        // Finite differences of equal values are exact zeros; the dx⁻⁴
        // scaling amplifies nothing.
        assert!(p.as_slice().iter().all(|v| v.abs() < EXACT_F64));
    }

    #[test]
    fn pressure_of_quadratic_matches_axis_matched_laplacian() {
        let n = 16;
        let state = grid(n, 4.0);
        let dx = state.config.dx();
        let f = ScalarField::from_fn(n, |i, j, k| {
            let x = i as f64 * dx;
            let y = j as f64 * dx;
            let z = k as f64 * dx;
            x * x + y * y + z * z
        });
        let p = quantum_pressure(&state, &f, &CpuBackend).unwrap();

        let scale = state.constants.hbar * state.constants.c / dx.powi(4);
        let expected = 6.0 * scale;
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 2..n - 2 {
            for j in 2..n - 2 {
                for k in 2..n - 2 {
                    sum += p.at(i, j, k);
                    count += 1;
                }
            }
        }
        let mean = sum / count as f64;
        assert!(
            (mean - expected).abs() / expected < STENCIL_QUADRATIC_REL,
            "interior mean {mean}, expected {expected}"
        );
    }

    #[test]
    fn pressure_shape_mismatch_rejected() {
        let state = grid(8, 4.0);
        let err = quantum_pressure(&state, &ScalarField::zeros(9), &CpuBackend).unwrap_err();
        assert!(matches!(err, EntrogravError::ShapeMismatch { .. }));
    }

    #[test]
    fn solve_with_zero_stress_preserves_background() {
        for iterations in [1usize, 50, 10_000] {
            let mut state = grid(6, 3.0);
            let zeros = ScalarField::zeros(6);
            solve_field_equations(
                &mut state,
                &zeros,
                &zeros,
                &SolveOptions::new(iterations),
                &CpuBackend,
            )
            .unwrap();
            for i in 0..6 {
                for j in 0..6 {
                    for k in 0..6 {
                        assert!((state.metric.g00(i, j, k) - 1.0).abs() < SOLVER_STATIC);
                    }
                }
            }
        }
    }

    #[test]
    fn solve_with_extreme_mass_saturates_upper_bound() {
        let mut state = grid(8, 4.0);
        let mass = ScalarField::uniform(8, 1e40);
        let entropy = ScalarField::zeros(8);
        solve_field_equations(&mut state, &mass, &entropy, &SolveOptions::new(3), &CpuBackend)
            .unwrap();
        for i in 0..8 {
            for j in 0..8 {
                for k in 0..8 {
                    let g = state.metric.g00(i, j, k);
                    assert!((0.1..=10.0).contains(&g));
                    assert!((g - 10.0).abs() < EXACT_F64);
                }
            }
        }
    }

    #[test]
    fn solve_clamps_regardless_of_iteration_count() {
        for iterations in [1usize, 10, 10_000] {
            let mut state = grid(4, 2.0);
            let mass = ScalarField::uniform(4, 1e40);
            solve_field_equations(
                &mut state,
                &mass,
                &ScalarField::zeros(4),
                &SolveOptions::new(iterations),
                &CpuBackend,
            )
            .unwrap();
            let g00 = state.metric.g00_field();
            assert!(g00.max() <= 10.0);
            assert!(g00.min() >= 0.1);
        }
    }

    #[test]
    fn solve_with_localized_spike_perturbs_metric() {
        let n = 12;
        let mut state = grid(n, 6.0);
        let before = state.metric.clone();

        // Dense spike at the center, entropy with spatial variation
        let mut mass = ScalarField::zeros(n);
        mass.set(n / 2, n / 2, n / 2, 1e30);
        let entropy = ScalarField::from_fn(n, |i, j, k| {
            1.0 + (i as f64 * 0.7).sin() * (j as f64 * 1.3).cos() + 0.1 * k as f64
        });

        solve_field_equations(&mut state, &mass, &entropy, &SolveOptions::new(1), &CpuBackend)
            .unwrap();
        assert_ne!(before.as_slice(), state.metric.as_slice());
    }

    #[test]
    fn solver_mutates_only_g00() {
        let n = 6;
        let mut state = grid(n, 3.0);
        let mass = ScalarField::uniform(n, 1e30);
        solve_field_equations(&mut state, &mass, &ScalarField::zeros(n), &SolveOptions::new(5), &CpuBackend)
            .unwrap();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    for r in 0..4 {
                        for c in 0..4 {
                            if (r, c) == (0, 0) {
                                continue;
                            }
                            let expected = if r == c { 1.0 } else { 0.0 };
                            assert!((state.metric.at(i, j, k, r, c) - expected).abs() < EXACT_F64);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn invalid_iterations_leave_state_untouched() {
        for iterations in [0usize, 10_001] {
            let mut state = grid(4, 2.0);
            let before = state.metric.clone();
            let err = solve_field_equations(
                &mut state,
                &ScalarField::uniform(4, 1e40),
                &ScalarField::zeros(4),
                &SolveOptions::new(iterations),
                &CpuBackend,
            )
            .unwrap_err();
            assert!(matches!(err, EntrogravError::Iterations(_)));
            assert_eq!(before.as_slice(), state.metric.as_slice());
        }
    }

    #[test]
    fn mismatched_shapes_leave_state_untouched() {
        let mut state = grid(8, 4.0);
        let before = state.metric.clone();

        let err = solve_field_equations(
            &mut state,
            &ScalarField::uniform(4, 1e40),
            &ScalarField::zeros(8),
            &SolveOptions::new(10),
            &CpuBackend,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EntrogravError::ShapeMismatch {
                field: "mass distribution",
                ..
            }
        ));

        let err = solve_field_equations(
            &mut state,
            &ScalarField::zeros(8),
            &ScalarField::uniform(16, 1.0),
            &SolveOptions::new(10),
            &CpuBackend,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EntrogravError::ShapeMismatch {
                field: "entropy map",
                ..
            }
        ));
        assert_eq!(before.as_slice(), state.metric.as_slice());
    }

    #[test]
    fn schedules_agree_for_static_inputs() {
        let n = 10;
        let mass = ScalarField::from_fn(n, |i, j, k| 1e28 * ((i + j + k) as f64));
        let entropy = ScalarField::from_fn(n, |i, j, _| ((i * j) as f64).sqrt());

        let mut pre = grid(n, 5.0);
        solve_field_equations(
            &mut pre,
            &mass,
            &entropy,
            &SolveOptions::new(20),
            &CpuBackend,
        )
        .unwrap();

        let mut per = grid(n, 5.0);
        solve_field_equations(
            &mut per,
            &mass,
            &entropy,
            &SolveOptions::new(20).with_schedule(PressureSchedule::PerIteration),
            &CpuBackend,
        )
        .unwrap();

        for (a, b) in pre
            .metric
            .as_slice()
            .iter()
            .zip(per.metric.as_slice().iter())
        {
            assert!((a - b).abs() < EXACT_F64);
        }
    }

    #[test]
    fn hazard_zero_for_untouched_metric() {
        let state = grid(8, 4.0);
        assert!(paradox_hazard(&state).abs() < f64::EPSILON);
    }

    #[test]
    fn hazard_bounded_after_saturating_solve() {
        let mut state = grid(6, 3.0);
        solve_field_equations(
            &mut state,
            &ScalarField::uniform(6, 1e40),
            &ScalarField::zeros(6),
            &SolveOptions::new(2),
            &CpuBackend,
        )
        .unwrap();
        let h = paradox_hazard(&state);
        assert!((0.0..=1.0).contains(&h));
        // Saturated at g₀₀ = 10 → deviation 9 → hazard exactly 1
        assert!((h - 1.0).abs() < EXACT_F64);
    }

    #[test]
    fn hazard_clamps_below_lower_bound_deviation() {
        let mut state = grid(4, 2.0);
        // Force g₀₀ to the lower bound directly: deviation 0.9 → 0.1 hazard
        let lows = vec![0.1; 64];
        state.metric.store_g00(&lows);
        let h = paradox_hazard(&state);
        assert!((h - 0.1).abs() < EXACT_F64);
    }
}
