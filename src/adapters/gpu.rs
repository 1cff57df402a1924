use crate::domain::model::{GpuInfo, GpuSample};
use crate::domain::ports::GpuProbe;

/// Used when NVML is not compiled in or no NVIDIA driver is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGpu;

impl GpuProbe for NoGpu {
    fn devices(&self) -> Vec<GpuInfo> {
        Vec::new()
    }

    fn sample(&self) -> Option<GpuSample> {
        None
    }
}

#[cfg(feature = "nvml")]
pub use nvml::NvmlGpuProbe;

#[cfg(feature = "nvml")]
mod nvml {
    use crate::domain::model::{GpuInfo, GpuSample};
    use crate::domain::ports::GpuProbe;
    use nvml_wrapper::Nvml;
    use once_cell::sync::Lazy;

    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    /// NVML must be initialized once per process.
    static NVML: Lazy<Option<Nvml>> = Lazy::new(|| Nvml::init().ok());

    /// Reads device 0 for samples and every device for the inventory.
    #[derive(Debug, Clone, Copy)]
    pub struct NvmlGpuProbe {
        sample_index: u32,
    }

    impl NvmlGpuProbe {
        pub fn try_new() -> Option<Self> {
            let nvml = NVML.as_ref()?;
            match nvml.device_count() {
                Ok(count) if count > 0 => Some(Self { sample_index: 0 }),
                _ => None,
            }
        }
    }

    impl GpuProbe for NvmlGpuProbe {
        fn devices(&self) -> Vec<GpuInfo> {
            let Some(nvml) = NVML.as_ref() else {
                return Vec::new();
            };
            let count = match nvml.device_count() {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!("GPU: Detection failed ({})", e);
                    return Vec::new();
                }
            };

            (0..count)
                .filter_map(|i| {
                    let device = nvml.device_by_index(i).ok()?;
                    let name = device.name().unwrap_or_else(|_| format!("GPU {}", i));
                    let memory_gb = device
                        .memory_info()
                        .map(|m| m.total as f64 / GIB)
                        .unwrap_or(0.0);
                    Some(GpuInfo { name, memory_gb })
                })
                .collect()
        }

        fn sample(&self) -> Option<GpuSample> {
            let device = NVML.as_ref()?.device_by_index(self.sample_index).ok()?;
            let utilization = device.utilization_rates().ok()?;
            let memory = device.memory_info().ok()?;
            Some(GpuSample {
                util_pct: utilization.gpu as f64,
                mem_used_mb: memory.used as f64 / MIB,
                mem_total_mb: memory.total as f64 / MIB,
            })
        }
    }
}

pub fn default_gpu_probe() -> Box<dyn GpuProbe> {
    #[cfg(feature = "nvml")]
    {
        if let Some(probe) = NvmlGpuProbe::try_new() {
            return Box::new(probe);
        }
        tracing::debug!("NVML not available, GPU metrics disabled");
    }
    Box::new(NoGpu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_probe_never_panics() {
        let probe = default_gpu_probe();
        for d in probe.devices() {
            assert!(d.memory_gb >= 0.0);
        }
        if let Some(sample) = probe.sample() {
            assert!(sample.mem_used_mb <= sample.mem_total_mb);
        }
    }

    #[test]
    fn test_no_gpu() {
        assert!(NoGpu.devices().is_empty());
        assert!(NoGpu.sample().is_none());
    }
}
