// SPDX-License-Identifier: AGPL-3.0-only

//! WGSL f64 compute kernels for the field solver.
//!
//! All kernels operate on flat `array<f64>` storage buffers in the same
//! row-major (i·n + j)·n + k layout the CPU path uses, so buffers upload
//! and read back without reshaping. Kernels linearize the invocation id
//! as `gid.x + gid.y · num_workgroups.x · 64` so 2D dispatch splits above
//! the 65535 workgroup limit are transparent. Uniform parameter structs
//! put the u32 members first and keep every f64 member 8-byte aligned;
//! the host-side mirrors below are `bytemuck::Pod` with explicit padding.

use bytemuck::{Pod, Zeroable};

/// One-axis finite-difference gradient: one-sided at the boundary planes,
/// central differences in the interior. `axis` selects the stride
/// (0 → n², 1 → n, 2 → 1).
pub const GRADIENT_AXIS_SHADER: &str = r"
struct Params {
    n: u32,
    axis: u32,
    inv_dx: f64,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> field: array<f64>;
@group(0) @binding(2) var<storage, read_write> grad: array<f64>;

@compute @workgroup_size(64)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    let id = gid.x + gid.y * nwg.x * 64u;
    let n = params.n;
    if (id >= n * n * n) {
        return;
    }
    if (n < 2u) {
        grad[id] = f64(0.0);
        return;
    }

    let i = id / (n * n);
    let j = (id / n) % n;
    let k = id % n;

    var stride: u32 = 1u;
    var pos: u32 = k;
    if (params.axis == 0u) {
        stride = n * n;
        pos = i;
    } else if (params.axis == 1u) {
        stride = n;
        pos = j;
    }

    if (pos == 0u) {
        grad[id] = (field[id + stride] - field[id]) * params.inv_dx;
    } else if (pos == n - 1u) {
        grad[id] = (field[id] - field[id - stride]) * params.inv_dx;
    } else {
        grad[id] = (field[id + stride] - field[id - stride]) * f64(0.5) * params.inv_dx;
    }
}
";

/// Scaled accumulate: `y += a · x`. Used to sum per-axis second
/// derivatives into the Laplacian with the physical scale folded in.
pub const AXPY_SHADER: &str = r"
struct Params {
    count: u32,
    _pad: u32,
    a: f64,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> x: array<f64>;
@group(0) @binding(2) var<storage, read_write> y: array<f64>;

@compute @workgroup_size(64)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    let id = gid.x + gid.y * nwg.x * 64u;
    if (id >= params.count) {
        return;
    }
    y[id] = y[id] + params.a * x[id];
}
";

/// Damped g₀₀ relaxation: per cell, apply `iterations` repetitions of
/// `g += damping · update` with the causality clamp after every single
/// repetition. Cells are independent, so looping inside the kernel is
/// equivalent to repeated full-grid sweeps.
pub const DAMPED_UPDATE_SHADER: &str = r"
struct Params {
    count: u32,
    iterations: u32,
    damping: f64,
    lo: f64,
    hi: f64,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> update: array<f64>;
@group(0) @binding(2) var<storage, read_write> g00: array<f64>;

@compute @workgroup_size(64)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    let id = gid.x + gid.y * nwg.x * 64u;
    if (id >= params.count) {
        return;
    }
    let step = params.damping * update[id];
    var g = g00[id];
    for (var it = 0u; it < params.iterations; it = it + 1u) {
        g = min(max(g + step, params.lo), params.hi);
    }
    g00[id] = g;
}
";

/// Uniform parameters for [`GRADIENT_AXIS_SHADER`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GradientParams {
    pub n: u32,
    pub axis: u32,
    pub inv_dx: f64,
}

/// Uniform parameters for [`AXPY_SHADER`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct AxpyParams {
    pub count: u32,
    pub _pad: u32,
    pub a: f64,
}

/// Uniform parameters for [`DAMPED_UPDATE_SHADER`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DampedUpdateParams {
    pub count: u32,
    pub iterations: u32,
    pub damping: f64,
    pub lo: f64,
    pub hi: f64,
}
