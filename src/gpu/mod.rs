// SPDX-License-Identifier: AGPL-3.0-only

//! GPU f64 compute backend for the field solver.
//!
//! Creates a wgpu device with `SHADER_F64` enabled and runs the solver's
//! dense-array operations as f64 compute shaders on any Vulkan GPU
//! (NVIDIA proprietary, NVK/nouveau, RADV, etc.).
//!
//! ## Adapter selection
//!
//! Set `ENTROGRAV_GPU_ADAPTER` to target a specific GPU:
//!
//! | Value | Behavior |
//! |-------|----------|
//! | `auto` / *(unset)* | Prefer a discrete adapter with `SHADER_F64` |
//! | `0`, `1`, … | Select adapter by enumeration index |
//! | substring | Case-insensitive name match (e.g. `"titan"`, `"radeon"`) |
//!
//! Use [`GpuContext::enumerate_adapters`] to list available GPUs before
//! selecting.
//!
//! ## Module structure
//!
//! - `adapter` — adapter discovery and selection
//! - `buffers` — f64 buffer creation, upload, readback
//! - `shaders` — WGSL kernels and their uniform parameter structs
//! - `backend` — [`crate::backend::Backend`] implementation

mod adapter;
mod backend;
mod buffers;
mod shaders;

pub use adapter::AdapterInfo;
pub use backend::GpuBackend;
pub use buffers::mapped_bytes_to_f64;

use crate::error::EntrogravError;

/// GPU device context with `SHADER_F64` guaranteed present.
#[must_use]
pub struct GpuContext {
    /// Adapter name as reported by the driver.
    pub adapter_name: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    /// Create a GPU device requiring `SHADER_F64`.
    ///
    /// # Errors
    ///
    /// [`EntrogravError::NoAdapter`] when wgpu finds no adapter at all,
    /// [`EntrogravError::NoShaderF64`] when the selected adapter cannot do
    /// f64 compute, and [`EntrogravError::DeviceCreation`] when the device
    /// request itself fails.
    pub async fn new() -> Result<Self, EntrogravError> {
        let selected = adapter::select_adapter()?;
        let adapter_info = selected.get_info();
        if !selected.features().contains(wgpu::Features::SHADER_F64) {
            return Err(EntrogravError::NoShaderF64);
        }

        // A 256³ f64 field is exactly the 128 MiB default binding limit;
        // raise it so full-resolution grids bind without truncation.
        let required_limits = wgpu::Limits {
            max_storage_buffer_binding_size: 512 * 1024 * 1024,
            max_buffer_size: 1024 * 1024 * 1024,
            ..wgpu::Limits::default()
        };

        let (device, queue) = selected
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("entrograv field device"),
                    required_features: wgpu::Features::SHADER_F64,
                    required_limits,
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| EntrogravError::DeviceCreation(e.to_string()))?;

        Ok(Self {
            adapter_name: adapter_info.name,
            device,
            queue,
        })
    }

    /// Access the underlying wgpu Device.
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Access the underlying wgpu Queue.
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Enumerate all available GPU adapters.
    #[must_use]
    pub fn enumerate_adapters() -> Vec<AdapterInfo> {
        adapter::enumerate_adapters()
    }

    /// Print all available adapters to stdout.
    pub fn print_available_adapters() {
        let adapters = Self::enumerate_adapters();
        println!("  Available GPU adapters:");
        for info in &adapters {
            let marker = if info.has_f64 { "✓" } else { "✗" };
            println!("    {marker} {info}");
        }
        if adapters.is_empty() {
            println!("    (none found)");
        }
    }

    /// Create a compute pipeline from WGSL source with `main` as the entry
    /// point.
    #[must_use]
    pub fn create_pipeline(&self, shader_source: &str, label: &str) -> wgpu::ComputePipeline {
        let shader_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });

        self.device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: None,
                module: &shader_module,
                entry_point: "main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            })
    }

    /// Create a bind group from a pipeline and ordered buffer slice.
    ///
    /// Each buffer is bound at binding index 0, 1, 2, ... in order.
    pub fn create_bind_group(
        &self,
        pipeline: &wgpu::ComputePipeline,
        buffers: &[&wgpu::Buffer],
    ) -> wgpu::BindGroup {
        let layout = pipeline.get_bind_group_layout(0);
        let entries: Vec<wgpu::BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(i, buf)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: buf.as_entire_binding(),
            })
            .collect();
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bind_group"),
            layout: &layout,
            entries: &entries,
        })
    }

    /// Begin a command encoder for batching multiple dispatches into a
    /// single queue submission.
    #[must_use]
    pub fn begin_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Submit a finished encoder to the GPU queue.
    pub fn submit_encoder(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Encode one compute pass into an existing encoder (no submit).
    pub fn encode_pass(
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        workgroups: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("compute_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        let (wx, wy, wz) = split_workgroups(workgroups);
        pass.dispatch_workgroups(wx, wy, wz);
    }

    /// Dispatch a compute pipeline and read back f64 results in one
    /// submission.
    ///
    /// # Errors
    ///
    /// Returns [`EntrogravError::DeviceCreation`] if the GPU map callback
    /// fails or the channel is dropped.
    pub fn dispatch_and_read(
        &self,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        workgroups: u32,
        output_buffer: &wgpu::Buffer,
        output_count: usize,
    ) -> Result<Vec<f64>, EntrogravError> {
        let staging = self.create_staging_buffer(output_count * 8, "staging");
        let mut encoder = self.begin_encoder("compute");
        Self::encode_pass(&mut encoder, pipeline, bind_group, workgroups);
        encoder.copy_buffer_to_buffer(output_buffer, 0, &staging, 0, (output_count * 8) as u64);
        self.queue.submit(std::iter::once(encoder.finish()));
        self.read_staging_f64(&staging)
    }
}

/// Split workgroup count into (x, y, 1) for 2D dispatch when x > 65535.
///
/// A full 256³ grid needs 262144 workgroups of 64 threads, well past the
/// per-dimension limit. Shaders must linearize via
/// `gid.x + gid.y * num_workgroups.x * 64`.
#[must_use]
pub fn split_workgroups(total: u32) -> (u32, u32, u32) {
    if total <= 65535 {
        (total, 1, 1)
    } else {
        let y = total.div_ceil(65535);
        let x = total.div_ceil(y);
        (x, y, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_small_counts_stay_1d() {
        assert_eq!(split_workgroups(1), (1, 1, 1));
        assert_eq!(split_workgroups(65535), (65535, 1, 1));
    }

    #[test]
    fn split_large_counts_cover_total() {
        for total in [65536u32, 262_144, 1_000_000] {
            let (x, y, z) = split_workgroups(total);
            assert_eq!(z, 1);
            assert!(x <= 65535 && y <= 65535);
            assert!(u64::from(x) * u64::from(y) >= u64::from(total));
        }
    }
}
