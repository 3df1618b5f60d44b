/// Hugging Face utilities
pub mod hugging_face;

/// Logger setup for the binaries
pub mod logging;

use anyhow::anyhow;
use candle_core::Device;

/// Pick the fastest device candle was built with, falling back to the CPU
pub fn device() -> anyhow::Result<Device> {
    if candle_core::utils::cuda_is_available() {
        Device::new_cuda(0).map_err(|e| anyhow!("Failed to create CUDA device: {}", e))
    } else if candle_core::utils::metal_is_available() {
        Device::new_metal(0).map_err(|e| anyhow!("Failed to create Metal device: {}", e))
    } else {
        Ok(Device::Cpu)
    }
}
