//! Configuration for the checkpoint serializer

use crate::error::{CheckpointError, Result};

/// Configuration for [`Serializer`](crate::Serializer)
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Clear the output directory before saving into it
    pub clean_output_dir: bool,
    /// Capacity of the buffered reader/writer wrapping the checkpoint file
    pub io_chunk_len: usize,
    /// Sync file contents to the device after a save completes
    pub fsync: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            clean_output_dir: true,
            io_chunk_len: 1 << 20,
            fsync: false,
        }
    }
}

impl SerializerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.io_chunk_len == 0 {
            return Err(CheckpointError::InvalidConfiguration {
                parameter: "io_chunk_len".to_string(),
                reason: "buffer capacity must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration for checkpoints that must survive power loss: keeps
    /// existing files in place and syncs every save to the device.
    pub fn durable() -> Self {
        Self {
            clean_output_dir: false,
            fsync: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SerializerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_len_rejected() {
        let config = SerializerConfig {
            io_chunk_len: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durable_preset() {
        let config = SerializerConfig::durable();
        assert!(config.fsync);
        assert!(!config.clean_output_dir);
        assert!(config.validate().is_ok());
    }
}
