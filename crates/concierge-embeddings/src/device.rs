//! Compute device and precision selection.

use candle_core::{DType, Device};
use tracing::{info, warn};

/// Which class of device an encoder ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// CUDA-class accelerator
    Accelerated,
    /// Plain CPU, always available
    Cpu,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Accelerated => "accelerated",
            DeviceKind::Cpu => "cpu",
        }
    }
}

/// Weight precision requested for a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Half-precision weights, smaller and faster to load
    Reduced,
    /// Full f32 weights, the safe default
    Full,
}

impl Precision {
    pub fn dtype(&self) -> DType {
        match self {
            Precision::Reduced => DType::F16,
            Precision::Full => DType::F32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Reduced => "reduced",
            Precision::Full => "full",
        }
    }
}

/// Pick a compute device.
///
/// An accelerator is used only when it is both preferred and the probe
/// actually produces a device; any probe failure falls back to CPU.
pub fn select_device(prefer_accelerated: bool) -> (Device, DeviceKind) {
    if prefer_accelerated && candle_core::utils::cuda_is_available() {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA device for encoding");
                return (device, DeviceKind::Accelerated);
            }
            Err(err) => {
                warn!(error = %err, "CUDA probe failed, falling back to CPU");
            }
        }
    }

    (Device::Cpu, DeviceKind::Cpu)
}
