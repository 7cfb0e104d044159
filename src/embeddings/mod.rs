//! Model inference seam: turns fixed-length token id sequences into pooled embeddings.

pub mod mock;
pub mod openai;

pub use mock::MockEncoder;
pub use openai::HttpEncoder;

use crate::error::{EvalError, Result};
use crate::eval::EmbeddingMatrix;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Compute device the model is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Device {
    #[default]
    Cpu,
    /// CUDA device ordinal
    Cuda(usize),
}

impl FromStr for Device {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(Device::Cuda)
                .ok_or_else(|| EvalError::Config(format!("Unknown device: {}", s))),
        }
    }
}

impl TryFrom<String> for Device {
    type Error = EvalError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
        }
    }
}

/// A code-search model reduced to its pooled output.
///
/// Implementations receive padded id sequences exactly as produced by the
/// tokenizer and must return one embedding per sequence, in input order.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, input_ids: &[Vec<u32>]) -> Result<EmbeddingMatrix>;

    /// Device the model runs on
    fn device(&self) -> Device;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_parse() {
        assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("CUDA".parse::<Device>().unwrap(), Device::Cuda(0));
        assert_eq!("cuda:3".parse::<Device>().unwrap(), Device::Cuda(3));
        assert!("tpu".parse::<Device>().is_err());
        assert!("cuda:x".parse::<Device>().is_err());
    }

    #[test]
    fn test_device_display_round_trip() {
        for device in [Device::Cpu, Device::Cuda(2)] {
            assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
        }
    }

    #[test]
    fn test_device_default() {
        assert_eq!(Device::default(), Device::Cpu);
    }
}
