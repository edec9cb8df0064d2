// SPDX-License-Identifier: AGPL-3.0-only

//! GPU capability probe: list adapters and verify f64 device creation.
//!
//! Run before the solver binaries to see which GPUs wgpu exposes and
//! whether the auto-selected one can do f64 compute:
//!   `cargo run --release --bin gpu_probe`
//!   `ENTROGRAV_GPU_ADAPTER=titan cargo run --release --bin gpu_probe`
//!
//! Exit code 0 = an f64-capable device was created.

use entrograv::gpu::{GpuBackend, GpuContext};

fn main() {
    println!("═══════════════════════════════════════════════════════════");
    println!("  GPU Probe");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    GpuContext::print_available_adapters();
    println!();

    match GpuBackend::create_blocking() {
        Ok(backend) => {
            println!("  Selected: {}", backend.adapter_name());
            println!("  SHADER_F64 device created — solver kernels will run here.");
        }
        Err(e) => {
            println!("  No usable f64 device: {e}");
            println!("  Solves will fall back to the CPU reference backend.");
            std::process::exit(1);
        }
    }
}
