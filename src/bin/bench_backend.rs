// SPDX-License-Identifier: AGPL-3.0-only

//! CPU vs GPU solve benchmark across grid sizes.
//!
//! Times the full field solve (pressure + damped relaxation) on the CPU
//! reference backend and, when an f64 adapter is present, on the GPU.
//! The solve is readback-bound at small grids; the GPU advantage only
//! appears once the N³ arrays dwarf the fixed dispatch cost.
//!
//!   `cargo run --release --bin bench_backend`
//!   `ENTROGRAV_GPU_ADAPTER=titan cargo run --release --bin bench_backend`
//!
//! Exit code 0 = benchmark complete (with or without GPU).

use std::time::Instant;

use entrograv::backend::{Backend, CpuBackend};
use entrograv::gpu::GpuBackend;
use entrograv::grid::GridState;
use entrograv::scenario::gaussian_blob;
use entrograv::solver::{solve_field_equations, SolveOptions};

const WARMUP_ROUNDS: usize = 1;
const MEASURE_ROUNDS: usize = 5;
const ITERATIONS: usize = 50;
const GRID_SIZES: [usize; 4] = [16, 32, 48, 64];

fn main() {
    println!("═══════════════════════════════════════════════════════════");
    println!("  Backend Benchmark: field solve, {ITERATIONS} iterations");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    let gpu = match GpuBackend::create_blocking() {
        Ok(b) => {
            println!("  GPU: {}", b.adapter_name());
            Some(b)
        }
        Err(e) => {
            println!("  GPU: unavailable ({e}) — CPU only");
            None
        }
    };
    println!();
    println!(
        "  {:>6} {:>12} {:>12} {:>10}",
        "grid", "cpu (ms)", "gpu (ms)", "speedup"
    );

    for &n in &GRID_SIZES {
        let cpu_ms = time_solve(n, &CpuBackend);
        match &gpu {
            Some(b) => {
                let gpu_ms = time_solve(n, b);
                println!(
                    "  {:>4}³ {:>12.3} {:>12.3} {:>9.2}×",
                    n,
                    cpu_ms,
                    gpu_ms,
                    cpu_ms / gpu_ms
                );
            }
            None => {
                println!("  {:>4}³ {:>12.3} {:>12} {:>10}", n, cpu_ms, "—", "—");
            }
        }
    }
}

/// Mean wall time in milliseconds for one full solve on `backend`.
fn time_solve(n: usize, backend: &dyn Backend) -> f64 {
    let domain = n as f64 / 2.0;
    let center = [domain / 2.0; 3];
    let state = GridState::new(n, domain).expect("grid construction");
    let mass = gaussian_blob(&state.config, center, domain / 8.0, 1e30);
    let entropy = gaussian_blob(&state.config, center, domain / 4.0, 5.0);
    let options = SolveOptions::new(ITERATIONS);

    for _ in 0..WARMUP_ROUNDS {
        let mut s = GridState::new(n, domain).expect("grid construction");
        solve_field_equations(&mut s, &mass, &entropy, &options, backend).expect("solve");
    }

    let t0 = Instant::now();
    for _ in 0..MEASURE_ROUNDS {
        let mut s = GridState::new(n, domain).expect("grid construction");
        solve_field_equations(&mut s, &mass, &entropy, &options, backend).expect("solve");
    }
    t0.elapsed().as_secs_f64() * 1e3 / MEASURE_ROUNDS as f64
}
