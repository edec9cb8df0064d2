// SPDX-License-Identifier: AGPL-3.0-only

//! GPU implementation of the solver's [`Backend`] trait.
//!
//! Every operation uploads its inputs, runs the f64 kernels from
//! [`super::shaders`], and reads the result back. The Laplacian batches
//! all nine dispatches (two gradient passes plus one accumulate per axis)
//! into a single queue submission.

use super::shaders::{
    AxpyParams, DampedUpdateParams, GradientParams, AXPY_SHADER, DAMPED_UPDATE_SHADER,
    GRADIENT_AXIS_SHADER,
};
use super::GpuContext;
use crate::backend::Backend;
use crate::constants::CausalityBounds;
use crate::error::EntrogravError;
use crate::field::{Axis, MetricField, ScalarField};

const WORKGROUP_SIZE: u32 = 64;

/// f64 GPU backend; numerically interchangeable with [`crate::backend::CpuBackend`]
/// within `tolerances::GPU_VS_CPU_F64`.
#[must_use]
pub struct GpuBackend {
    ctx: GpuContext,
    gradient: wgpu::ComputePipeline,
    axpy: wgpu::ComputePipeline,
    damped_update: wgpu::ComputePipeline,
}

impl GpuBackend {
    /// Wrap an existing device context, compiling the solver kernels.
    pub fn new(ctx: GpuContext) -> Self {
        let gradient = ctx.create_pipeline(GRADIENT_AXIS_SHADER, "gradient_axis");
        let axpy = ctx.create_pipeline(AXPY_SHADER, "axpy");
        let damped_update = ctx.create_pipeline(DAMPED_UPDATE_SHADER, "damped_update");
        Self {
            ctx,
            gradient,
            axpy,
            damped_update,
        }
    }

    /// Create a device and backend without an async caller.
    ///
    /// # Errors
    ///
    /// Propagates adapter/device failures from [`GpuContext::new`]; a
    /// runtime construction failure is reported as
    /// [`EntrogravError::DeviceCreation`].
    pub fn create_blocking() -> Result<Self, EntrogravError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| EntrogravError::DeviceCreation(format!("tokio runtime: {e}")))?;
        let ctx = rt.block_on(GpuContext::new())?;
        Ok(Self::new(ctx))
    }

    /// Adapter name as reported by the driver.
    #[must_use]
    pub fn adapter_name(&self) -> &str {
        &self.ctx.adapter_name
    }

    /// Borrow the underlying device context.
    #[must_use]
    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }
}

const fn axis_index(axis: Axis) -> u32 {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

impl Backend for GpuBackend {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn scaled_laplacian(
        &self,
        field: &ScalarField,
        dx: f64,
        scale: f64,
    ) -> Result<ScalarField, EntrogravError> {
        let n = field.n();
        let len = field.len();
        let workgroups = (len as u32).div_ceil(WORKGROUP_SIZE);

        let input = self.ctx.create_f64_buffer(field.as_slice(), "laplacian input");
        let first = self.ctx.create_f64_output_buffer(len, "first derivative");
        let second = self.ctx.create_f64_output_buffer(len, "second derivative");
        let accum = self
            .ctx
            .create_f64_buffer(&vec![0.0; len], "laplacian accum");
        let axpy_params = AxpyParams {
            count: len as u32,
            _pad: 0,
            a: scale,
        };
        let axpy_uniform = self.ctx.create_uniform_buffer(&axpy_params, "axpy params");
        let staging = self.ctx.create_staging_buffer(len * 8, "laplacian staging");

        // One submission: per axis, gradient of the field, gradient of
        // that gradient, then accum += scale · second. The `first` and
        // `second` buffers are reused; pass ordering keeps each axis's
        // writes visible to the next dispatch.
        let mut encoder = self.ctx.begin_encoder("laplacian");
        for axis in Axis::ALL {
            let params = GradientParams {
                n: n as u32,
                axis: axis_index(axis),
                inv_dx: 1.0 / dx,
            };
            let uniform = self.ctx.create_uniform_buffer(&params, "gradient params");
            let outer = self
                .ctx
                .create_bind_group(&self.gradient, &[&uniform, &input, &first]);
            GpuContext::encode_pass(&mut encoder, &self.gradient, &outer, workgroups);
            let inner = self
                .ctx
                .create_bind_group(&self.gradient, &[&uniform, &first, &second]);
            GpuContext::encode_pass(&mut encoder, &self.gradient, &inner, workgroups);
            let add = self
                .ctx
                .create_bind_group(&self.axpy, &[&axpy_uniform, &second, &accum]);
            GpuContext::encode_pass(&mut encoder, &self.axpy, &add, workgroups);
        }
        encoder.copy_buffer_to_buffer(&accum, 0, &staging, 0, (len * 8) as u64);
        self.ctx.submit_encoder(encoder);

        let data = self.ctx.read_staging_f64(&staging)?;
        Ok(ScalarField::from_vec(n, data))
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
        let g00 = metric.g00_field();
        let params = DampedUpdateParams {
            count: cells as u32,
            iterations: iterations as u32,
            damping,
            lo: bounds.lo,
            hi: bounds.hi,
        };
        let uniform = self.ctx.create_uniform_buffer(&params, "update params");
        let update_buf = self
            .ctx
            .create_f64_buffer(update.as_slice(), "curvature update");
        let g00_buf = self.ctx.create_f64_buffer(g00.as_slice(), "g00");
        let bind = self
            .ctx
            .create_bind_group(&self.damped_update, &[&uniform, &update_buf, &g00_buf]);
        let workgroups = (cells as u32).div_ceil(WORKGROUP_SIZE);
        let relaxed =
            self.ctx
                .dispatch_and_read(&self.damped_update, &bind, workgroups, &g00_buf, cells)?;
        metric.store_g00(&relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::grid::GridState;
    use crate::solver::{solve_field_equations, SolveOptions};
    use crate::tolerances::GPU_VS_CPU_F64;

    fn gpu() -> Option<GpuBackend> {
        match GpuBackend::create_blocking() {
            Ok(b) => Some(b),
            Err(e) => {
                eprintln!("skipping GPU test: {e}");
                None
            }
        }
    }

    fn wavy_field(n: usize) -> ScalarField {
        ScalarField::from_fn(n, |i, j, k| {
            (i as f64 * 0.37).sin() + (j as f64 * 0.73).cos() * (k as f64 * 0.11 + 1.0)
        })
    }

    #[test]
    fn scaled_laplacian_matches_cpu() {
        let Some(gpu) = gpu() else { return };
        let f = wavy_field(10);
        let g = gpu.scaled_laplacian(&f, 0.5, 3.0e-7).unwrap();
        let c = CpuBackend.scaled_laplacian(&f, 0.5, 3.0e-7).unwrap();
        for (a, b) in g.as_slice().iter().zip(c.as_slice()) {
            assert!((a - b).abs() < GPU_VS_CPU_F64, "{a} vs {b}");
        }
    }

    #[test]
    fn damped_update_matches_cpu() {
        let Some(gpu) = gpu() else { return };
        let n = 8;
        let update = wavy_field(n);
        let mut on_gpu = MetricField::background(n);
        let mut on_cpu = MetricField::background(n);
        gpu.damped_update_g00(&mut on_gpu, &update, 0.01, 25, CausalityBounds::default())
            .unwrap();
        CpuBackend
            .damped_update_g00(&mut on_cpu, &update, 0.01, 25, CausalityBounds::default())
            .unwrap();
        for (a, b) in on_gpu.as_slice().iter().zip(on_cpu.as_slice()) {
            assert!((a - b).abs() < GPU_VS_CPU_F64);
        }
    }

    #[test]
    fn full_solve_matches_cpu() {
        let Some(gpu) = gpu() else { return };
        let n = 10;
        let mass = ScalarField::from_fn(n, |i, j, k| 1e28 * ((i + j + k) as f64));
        let entropy = wavy_field(n);
        let options = SolveOptions::new(15);

        let mut gpu_state = GridState::new(n, 5.0).unwrap();
        solve_field_equations(&mut gpu_state, &mass, &entropy, &options, &gpu).unwrap();
        let mut cpu_state = GridState::new(n, 5.0).unwrap();
        solve_field_equations(&mut cpu_state, &mass, &entropy, &options, &CpuBackend).unwrap();

        for (a, b) in gpu_state
            .metric
            .as_slice()
            .iter()
            .zip(cpu_state.metric.as_slice())
        {
            assert!((a - b).abs() < GPU_VS_CPU_F64);
        }
    }
}
