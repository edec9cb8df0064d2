// SPDX-License-Identifier: AGPL-3.0-only

//! Stellar-core collapse scenario.
//!
//! A dense Gaussian mass blob at the domain center against a perturbed
//! entropy atmosphere: solve the static metric, read the paradox hazard,
//! then evolve the system forward with diffusing entropy and report how
//! the metric statistics drift. Results land in `results/` as JSON.
//!
//! Runs on the GPU when an f64-capable adapter is present, otherwise on
//! the CPU reference backend:
//!   `cargo run --release --bin scenario_collapse`

use std::path::Path;

use serde::Serialize;

use entrograv::backend::{Backend, CpuBackend};
use entrograv::diagnostics::{save_json_to_results, FieldSummary};
use entrograv::evolution::{EntropySource, EvolutionRecord, TimeEvolution};
use entrograv::gpu::GpuBackend;
use entrograv::grid::GridState;
use entrograv::scenario::{flux_anomaly, gaussian_blob, perturb_abs};
use entrograv::solver::{paradox_hazard, quantum_pressure, solve_field_equations, SolveOptions};

const GRID_SIZE: usize = 32;
const DOMAIN_SIZE: f64 = 16.0;
const SOLVE_ITERATIONS: usize = 200;
const CORE_MASS_DENSITY: f64 = 1e30;
const EVOLVE_DT: f64 = 0.5;
const EVOLVE_STEPS: usize = 50;
const NOISE_SEED: u64 = 42;

#[derive(Serialize)]
struct CollapseRecord {
    grid_size: usize,
    domain_size: f64,
    iterations: usize,
    backend: &'static str,
    quantum_pressure: FieldSummary,
    g00: FieldSummary,
    paradox_hazard: f64,
    flux_density: f64,
    quantum_shift: f64,
    evolution: Vec<EvolutionRecord>,
}

fn main() {
    println!("═══════════════════════════════════════════════════════════");
    println!("  Stellar-Core Collapse Scenario");
    println!("═══════════════════════════════════════════════════════════");
    println!("  grid {GRID_SIZE}³, domain {DOMAIN_SIZE} m, {SOLVE_ITERATIONS} iterations");
    println!();

    let gpu = match GpuBackend::create_blocking() {
        Ok(b) => {
            println!("  Backend: gpu ({})", b.adapter_name());
            Some(b)
        }
        Err(e) => {
            println!("  Backend: cpu (GPU unavailable: {e})");
            None
        }
    };
    let backend: &dyn Backend = gpu.as_ref().map_or(&CpuBackend, |b| b);
    println!();

    let mut state = GridState::new(GRID_SIZE, DOMAIN_SIZE).expect("grid construction");
    let center = [DOMAIN_SIZE / 2.0; 3];
    let mass = gaussian_blob(&state.config, center, DOMAIN_SIZE / 8.0, CORE_MASS_DENSITY);
    let mut entropy = gaussian_blob(&state.config, center, DOMAIN_SIZE / 4.0, 5.0);
    perturb_abs(&mut entropy, 0.1, NOISE_SEED);

    let pressure = quantum_pressure(&state, &entropy, backend).expect("pressure");
    let pressure_summary = FieldSummary::of(&pressure);
    println!("── Static solve ────────────────────────────────────────────");
    println!("  mass      {}", FieldSummary::of(&mass));
    println!("  entropy   {}", FieldSummary::of(&entropy));
    println!("  pressure  {pressure_summary}");

    solve_field_equations(
        &mut state,
        &mass,
        &entropy,
        &SolveOptions::new(SOLVE_ITERATIONS),
        backend,
    )
    .expect("field solve");

    let g00_summary = FieldSummary::of_g00(&state.metric);
    let hazard = paradox_hazard(&state);
    println!("  g00       {g00_summary}");
    println!("  paradox hazard: {hazard:.6}");
    println!();

    // Integrated core mass for the flux readout: density × cell volume.
    let cell_volume = state.config.dx().powi(3);
    let total_mass = mass.mean() * mass.len() as f64 * cell_volume;
    let anomaly = flux_anomaly(total_mass, DOMAIN_SIZE / 2.0);
    println!("── Flux anomaly ────────────────────────────────────────────");
    println!("  flux density : {:.6e}", anomaly.flux_density);
    println!("  quantum shift: {:.6e}", anomaly.quantum_shift);
    println!();

    println!("── Time evolution ──────────────────────────────────────────");
    let mut evolution =
        TimeEvolution::new(GRID_SIZE, DOMAIN_SIZE, EVOLVE_DT).expect("evolution setup");
    let mut source = EntropySource::Diffusing(entropy);
    evolution
        .evolve(&mass, &mut source, EVOLVE_STEPS, backend)
        .expect("evolution");
    report_evolution(evolution.history());

    let record = CollapseRecord {
        grid_size: GRID_SIZE,
        domain_size: DOMAIN_SIZE,
        iterations: SOLVE_ITERATIONS,
        backend: backend.name(),
        quantum_pressure: pressure_summary,
        g00: g00_summary,
        paradox_hazard: hazard,
        flux_density: anomaly.flux_density,
        quantum_shift: anomaly.quantum_shift,
        evolution: evolution.history().to_vec(),
    };
    println!();
    save_json_to_results(Path::new("."), "scenario_collapse.json", &record);
}

fn report_evolution(history: &[EvolutionRecord]) {
    println!(
        "  {:>8} {:>14} {:>14} {:>14}",
        "t (s)", "mean g00", "std g00", "mean |K|"
    );
    for record in history.iter().step_by(10).chain(history.last()) {
        println!(
            "  {:>8.1} {:>14.6e} {:>14.6e} {:>14.6e}",
            record.time, record.metric_mean, record.metric_std, record.curvature_mean_abs
        );
    }
}
