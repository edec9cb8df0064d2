// SPDX-License-Identifier: AGPL-3.0-only

//! GPU adapter discovery and selection.
//!
//! The solver needs exactly one capability from an adapter: `SHADER_F64`.
//! Discovery probes every adapter wgpu exposes; selection is driven by
//! `ENTROGRAV_GPU_ADAPTER` (an index, a name substring, or `auto`) and
//! otherwise prefers a discrete f64-capable device.

use crate::error::EntrogravError;

/// Summary of a discovered GPU adapter.
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    /// Enumeration index (stable within a single run).
    pub index: usize,
    /// Adapter name as reported by the driver.
    pub name: String,
    /// Driver name (e.g. `"NVIDIA"`, `"NVK"`, `"radv"`).
    pub driver: String,
    /// Whether `SHADER_F64` is supported.
    pub has_f64: bool,
    /// Adapter device type (discrete, integrated, software, etc.).
    pub device_type: wgpu::DeviceType,
}

impl AdapterInfo {
    fn probe(index: usize, adapter: &wgpu::Adapter) -> Self {
        let info = adapter.get_info();
        Self {
            index,
            name: info.name,
            driver: info.driver,
            has_f64: adapter.features().contains(wgpu::Features::SHADER_F64),
            device_type: info.device_type,
        }
    }

    /// The auto-selection ranking: f64 first, discrete among those, then
    /// enumeration order. Lower sorts earlier.
    fn rank(&self) -> (bool, bool, usize) {
        (
            !self.has_f64,
            self.device_type != wgpu::DeviceType::DiscreteGpu,
            self.index,
        )
    }
}

impl std::fmt::Display for AdapterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.device_type {
            wgpu::DeviceType::DiscreteGpu => "discrete",
            wgpu::DeviceType::IntegratedGpu => "integrated",
            wgpu::DeviceType::VirtualGpu => "virtual",
            wgpu::DeviceType::Cpu => "cpu",
            wgpu::DeviceType::Other => "other",
        };
        let f64_tag = if self.has_f64 { "f64" } else { "no f64" };
        write!(
            f,
            "[{}] {} — {} {}, {}",
            self.index, self.name, self.driver, kind, f64_tag
        )
    }
}

/// What `ENTROGRAV_GPU_ADAPTER` asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    /// Best f64-capable adapter, discrete preferred.
    Auto,
    /// Exact enumeration index.
    Index(usize),
    /// Case-insensitive name substring.
    Name(String),
}

impl Selector {
    fn from_env() -> Self {
        Self::parse(&std::env::var("ENTROGRAV_GPU_ADAPTER").unwrap_or_default())
    }

    fn parse(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s.is_empty() || s == "auto" {
            Self::Auto
        } else if let Ok(idx) = s.parse::<usize>() {
            Self::Index(idx)
        } else {
            Self::Name(s)
        }
    }
}

fn instance() -> wgpu::Instance {
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Enumerate all available GPU adapters.
///
/// Use the `index` field with `ENTROGRAV_GPU_ADAPTER=<index>` to target a
/// specific GPU.
#[must_use]
pub fn enumerate_adapters() -> Vec<AdapterInfo> {
    instance()
        .enumerate_adapters(wgpu::Backends::all())
        .iter()
        .enumerate()
        .map(|(i, a)| AdapterInfo::probe(i, a))
        .collect()
}

/// Select an adapter per `ENTROGRAV_GPU_ADAPTER`.
///
/// # Errors
///
/// [`EntrogravError::NoAdapter`] when wgpu exposes no adapters at all;
/// [`EntrogravError::NoShaderF64`] when auto-selection finds none with
/// f64 support; [`EntrogravError::DeviceCreation`] when an explicit index
/// or name matches nothing.
pub fn select_adapter() -> Result<wgpu::Adapter, EntrogravError> {
    let adapters = instance().enumerate_adapters(wgpu::Backends::all());
    if adapters.is_empty() {
        return Err(EntrogravError::NoAdapter);
    }
    let count = adapters.len();
    let mut probed: Vec<(AdapterInfo, wgpu::Adapter)> = adapters
        .into_iter()
        .enumerate()
        .map(|(i, a)| (AdapterInfo::probe(i, &a), a))
        .collect();

    match Selector::from_env() {
        Selector::Auto => {
            probed.sort_by_key(|(info, _)| info.rank());
            let (best, adapter) = probed.swap_remove(0);
            if best.has_f64 {
                Ok(adapter)
            } else {
                Err(EntrogravError::NoShaderF64)
            }
        }
        Selector::Index(idx) => probed
            .into_iter()
            .nth(idx)
            .map(|(_, adapter)| adapter)
            .ok_or_else(|| {
                EntrogravError::DeviceCreation(format!(
                    "adapter index {idx} out of range ({count} found)"
                ))
            }),
        Selector::Name(pattern) => probed
            .into_iter()
            .find(|(info, _)| info.name.to_ascii_lowercase().contains(&pattern))
            .map(|(_, adapter)| adapter)
            .ok_or_else(|| {
                EntrogravError::DeviceCreation(format!("no adapter matching '{pattern}'"))
            }),
    }
}
