// SPDX-License-Identifier: AGPL-3.0-only

//! entrograv — entropic-gravity field solver
//!
//! Finite-difference synthesis of a 4×4 metric tensor field on an N³
//! grid. A mass distribution sources attractive stress-energy; the
//! discrete Laplacian of an entropy field sources a repulsive quantum
//! pressure; the solver relaxes the metric's g₀₀ component between them
//! under damping, with a hard causality clamp and a paradox-hazard
//! readout. Everything is f64 end to end, on the CPU reference backend
//! or on any `SHADER_F64` GPU via wgpu.
//!
//! ## Modules
//!   - `constants` — physical constants, couplings, causality bounds
//!   - `error` — typed validation and device errors
//!   - `field` — dense scalar and metric fields, flat row-major storage
//!   - `grid` — validated grid configuration and simulation state
//!   - `stencil` — finite-difference gradient and Laplacian
//!   - `backend` — the CPU/GPU compute seam
//!   - `solver` — quantum pressure, iterative g₀₀ solve, hazard readout
//!   - `evolution` — explicit time stepping with extrinsic curvature
//!   - `scenario` — analytic mass/entropy field builders, flux anomaly
//!   - `diagnostics` — field summaries, slices, JSON export
//!   - `gpu` — wgpu f64 device, kernels, and GPU backend
//!   - `tolerances` — centralized numeric test tolerances
//!
//! ## Binaries
//!   - `scenario_collapse` — stellar-core collapse demo with JSON export
//!   - `bench_backend` — CPU vs GPU solve timing across grid sizes
//!   - `gpu_probe` — list available adapters and f64 capability

pub mod backend;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod evolution;
pub mod field;
pub mod gpu;
pub mod grid;
pub mod scenario;
pub mod solver;
pub mod stencil;
pub mod tolerances;
