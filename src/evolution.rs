// SPDX-License-Identifier: AGPL-3.0-only

//! Time-stepped metric evolution (simplified 3+1 decomposition).
//!
//! Extends the static solver with an ADM-style collaborator: the spacetime
//! is sliced into spatial hypersurfaces evolved with a fixed time step.
//! Alongside the metric it carries an extrinsic-curvature field, a lapse
//! function, and a shift vector. The update rules are deliberately
//! truncated — no Ricci terms, no lapse/shift dynamics — matching the
//! crate's toy-physics scope.
//!
//! Unlike the static solver, the ADM update applies no causality clamp;
//! the clamp is a property of the iterative solve contract, not of the
//! evolution path.

use serde::Serialize;

use crate::backend::Backend;
use crate::constants::{
    ADM_CURVATURE_DAMPING, ADM_METRIC_DAMPING, ENTROPY_DIFFUSION, MAX_DT, MAX_TIME_STEPS,
};
use crate::error::EntrogravError;
use crate::field::ScalarField;
use crate::grid::GridState;
use crate::solver::quantum_pressure;
use crate::stencil;

/// Where the entropy field comes from at each time step.
pub enum EntropySource {
    /// A fixed field reused every step.
    Static(ScalarField),
    /// A field diffused in place each step: ∂S/∂t = D ∇²S, then made
    /// non-negative.
    Diffusing(ScalarField),
    /// A caller-supplied function of simulation time. Must produce
    /// grid-shaped fields for every t.
    Driven(Box<dyn Fn(f64) -> ScalarField>),
}

impl std::fmt::Debug for EntropySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("EntropySource::Static"),
            Self::Diffusing(_) => f.write_str("EntropySource::Diffusing"),
            Self::Driven(_) => f.write_str("EntropySource::Driven"),
        }
    }
}

/// Per-step summary of the evolving state.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionRecord {
    /// Simulation time after this step (s).
    pub time: f64,
    /// Mean g₀₀ over the grid.
    pub metric_mean: f64,
    /// Standard deviation of g₀₀ (inhomogeneity measure).
    pub metric_std: f64,
    /// Mean |K| over all extrinsic-curvature components.
    pub curvature_mean_abs: f64,
    /// Mean entropy at this step.
    pub entropy_mean: f64,
}

/// Time-evolution state wrapping a [`GridState`].
#[derive(Debug)]
pub struct TimeEvolution {
    state: GridState,
    dt: f64,
    current_time: f64,
    /// Extrinsic curvature K, shape N³×3×3, flat.
    extrinsic: Vec<f64>,
    /// Lapse function α, initialized to 1 (proper time = coordinate time).
    /// Carried for the full ADM form; the truncated update never reads it.
    lapse: Vec<f64>,
    /// Shift vector βⁱ, shape N³×3, initialized to 0. Carried like `lapse`.
    shift: Vec<f64>,
    history: Vec<EvolutionRecord>,
}

impl TimeEvolution {
    /// Construct an evolution wrapper with validated time step.
    ///
    /// # Errors
    ///
    /// Grid validation errors from [`GridState::new`];
    /// [`EntrogravError::TimeStep`] when `dt` is not positive and finite
    /// or exceeds 1000 s.
    pub fn new(grid_size: usize, domain_size: f64, dt: f64) -> Result<Self, EntrogravError> {
        if !dt.is_finite() || dt <= 0.0 || dt > MAX_DT {
            return Err(EntrogravError::TimeStep(dt));
        }
        let state = GridState::new(grid_size, domain_size)?;
        let cells = grid_size * grid_size * grid_size;
        Ok(Self {
            state,
            dt,
            current_time: 0.0,
            extrinsic: vec![0.0; cells * 9],
            lapse: vec![1.0; cells],
            shift: vec![0.0; cells * 3],
            history: Vec::new(),
        })
    }

    /// The wrapped grid state (metric readable at any time).
    #[must_use]
    pub const fn state(&self) -> &GridState {
        &self.state
    }

    /// Simulation time reached so far (s).
    #[must_use]
    pub const fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Time step size (s).
    #[must_use]
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// History of all steps evolved so far.
    #[must_use]
    pub fn history(&self) -> &[EvolutionRecord] {
        &self.history
    }

    /// Lapse function α (read-only).
    #[must_use]
    pub fn lapse(&self) -> &[f64] {
        &self.lapse
    }

    /// Shift vector βⁱ (read-only).
    #[must_use]
    pub fn shift(&self) -> &[f64] {
        &self.shift
    }

    /// Mean |K| over all extrinsic-curvature components.
    #[must_use]
    pub fn curvature_mean_abs(&self) -> f64 {
        self.extrinsic.iter().map(|v| v.abs()).sum::<f64>() / self.extrinsic.len() as f64
    }

    /// Evolve the metric forward by `time_steps` steps.
    ///
    /// Per step: obtain the entropy field from `entropy` (static,
    /// diffused, or driven), compute total stress ρc² − P_quantum, apply
    /// the truncated ADM updates to g₀₀, the spatial diagonal, and the
    /// extrinsic-curvature diagonal, advance time, and record a history
    /// entry. Returns the records appended by this call.
    ///
    /// # Errors
    ///
    /// [`EntrogravError::TimeSteps`] when `time_steps ∉ 1..=5000`;
    /// [`EntrogravError::ShapeMismatch`] when the mass field or any
    /// entropy field does not match the grid. Validation of the mass
    /// field and the initial entropy happens before any mutation.
    pub fn evolve(
        &mut self,
        mass_distribution: &ScalarField,
        entropy: &mut EntropySource,
        time_steps: usize,
        backend: &dyn Backend,
    ) -> Result<&[EvolutionRecord], EntrogravError> {
        if time_steps == 0 || time_steps > MAX_TIME_STEPS {
            return Err(EntrogravError::TimeSteps(time_steps));
        }
        self.state
            .config
            .check_shape(mass_distribution, "mass distribution")?;
        match entropy {
            EntropySource::Static(f) | EntropySource::Diffusing(f) => {
                self.state.config.check_shape(f, "entropy map")?;
            }
            EntropySource::Driven(f) => {
                let sample = f(self.current_time);
                self.state.config.check_shape(&sample, "entropy map")?;
            }
        }

        let first_new = self.history.len();
        let c2 = self.state.constants.c * self.state.constants.c;
        let metric_coupling = self.state.constants.einstein_coupling();
        let k_coupling = self.state.constants.curvature_coupling();
        let n = self.state.config.grid_size();
        let cells = n * n * n;

        let mut driven_field: Option<ScalarField> = None;
        for _ in 0..time_steps {
            // Entropy for this step
            match entropy {
                EntropySource::Static(_) => {}
                EntropySource::Diffusing(f) => {
                    diffuse_entropy(f, self.state.config.dx(), self.dt);
                }
                EntropySource::Driven(f) => {
                    let sample = f(self.current_time);
                    self.state.config.check_shape(&sample, "entropy map")?;
                    driven_field = Some(sample);
                }
            }
            let current_entropy: &ScalarField = match entropy {
                EntropySource::Static(f) | EntropySource::Diffusing(f) => f,
                EntropySource::Driven(_) => driven_field
                    .as_ref()
                    .unwrap_or_else(|| unreachable!("driven field set above")),
            };

            // Stress and truncated ADM updates
            let pressure = quantum_pressure(&self.state, current_entropy, backend)?;
            let mass = mass_distribution.as_slice();
            let p = pressure.as_slice();
            let metric = self.state.metric.as_mut_slice();
            let dt = self.dt;
            for cell in 0..cells {
                let total_stress = mass[cell] * c2 - p[cell];
                let metric_source = metric_coupling * total_stress;
                let k_source = k_coupling * total_stress;

                // g₀₀ and spatial diagonal share the damped source term
                let base = cell * 16;
                metric[base] += dt * ADM_METRIC_DAMPING * metric_source;
                for d in 1..4 {
                    metric[base + d * 4 + d] += dt * ADM_METRIC_DAMPING * metric_source;
                }

                let k_base = cell * 9;
                for d in 0..3 {
                    self.extrinsic[k_base + d * 3 + d] += dt * ADM_CURVATURE_DAMPING * k_source;
                }
            }

            self.current_time += dt;

            let g00 = self.state.metric.g00_field();
            self.history.push(EvolutionRecord {
                time: self.current_time,
                metric_mean: g00.mean(),
                metric_std: g00.std_dev(),
                curvature_mean_abs: self.curvature_mean_abs(),
                entropy_mean: current_entropy.mean(),
            });
        }

        Ok(&self.history[first_new..])
    }
}

/// One entropy diffusion step: S += dt · D · ∇²S, then |S|.
///
/// The absolute value keeps the field physical (entropy is non-negative)
/// at the cost of reflecting overshoot at zero.
fn diffuse_entropy(field: &mut ScalarField, dx: f64, dt: f64) {
    let lap = stencil::laplacian(field, dx);
    for (s, l) in field.as_mut_slice().iter_mut().zip(lap.as_slice()) {
        *s += dt * ENTROPY_DIFFUSION * l;
    }
    field.abs_in_place();
}
