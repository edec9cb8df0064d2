// SPDX-License-Identifier: AGPL-3.0-only

//! GPU buffer creation and staged readback for f64 field data.

use super::GpuContext;
use crate::error::EntrogravError;

impl GpuContext {
    /// Create a storage buffer from f64 data.
    #[must_use]
    pub fn create_f64_buffer(&self, data: &[f64], label: &str) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: &bytes,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            })
    }

    /// Create a writable storage buffer for f64 output.
    #[must_use]
    pub fn create_f64_output_buffer(&self, count: usize, label: &str) -> wgpu::Buffer {
        self.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (count * 8) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }

    /// Create a staging buffer for reading results back to CPU.
    #[must_use]
    pub fn create_staging_buffer(&self, size: usize, label: &str) -> wgpu::Buffer {
        self.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create a uniform buffer from a `Pod` parameter struct.
    #[must_use]
    pub fn create_uniform_buffer<T: bytemuck::Pod>(&self, params: &T, label: &str) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;
        self.device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(params),
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    /// Read f64 data from a staging buffer after a submitted
    /// `copy_buffer_to_buffer` into it.
    ///
    /// # Errors
    ///
    /// Returns [`EntrogravError::DeviceCreation`] if the GPU map callback
    /// fails or the channel is dropped.
    pub fn read_staging_f64(&self, staging: &wgpu::Buffer) -> Result<Vec<f64>, EntrogravError> {
        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device().poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| {
                EntrogravError::DeviceCreation("GPU map callback: channel recv failed".into())
            })?
            .map_err(|e| EntrogravError::DeviceCreation(format!("GPU buffer mapping: {e}")))?;

        let data = slice.get_mapped_range();
        let result = mapped_bytes_to_f64(&data);
        drop(data);
        staging.unmap();
        Ok(result)
    }
}

/// Convert mapped GPU buffer bytes to f64 values.
///
/// Mapped ranges are typically page-aligned, so `bytemuck::try_cast_slice`
/// will succeed. Falls back to manual byte conversion if alignment is wrong.
pub fn mapped_bytes_to_f64(data: &[u8]) -> Vec<f64> {
    bytemuck::try_cast_slice(data).map_or_else(
        |_| {
            data.chunks_exact(8)
                .map(|chunk| {
                    let mut b = [0u8; 8];
                    b.copy_from_slice(chunk);
                    f64::from_le_bytes(b)
                })
                .collect()
        },
        <[f64]>::to_vec,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_bytes_roundtrip() {
        let original = [0.0, 1.0, -1.0, std::f64::consts::PI, 1e-308, 1e308];
        let bytes: Vec<u8> = original.iter().flat_map(|v| v.to_le_bytes()).collect();
        let back = mapped_bytes_to_f64(&bytes);
        assert_eq!(back.len(), original.len());
        for (a, b) in original.iter().zip(&back) {
            assert!((a - b).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn mapped_bytes_empty() {
        assert!(mapped_bytes_to_f64(&[]).is_empty());
    }
}
