#[cfg(unix)]
use std::path::PathBuf;

use picolink_frame::{ATOMIC_RX, ATOMIC_TX, MAX_ANSWER_PAYLOAD, MAX_COMMAND_PAYLOAD};
#[cfg(unix)]
use picolink_transport::{candidate_paths, SerialConfig};

use crate::error::{LinkError, Result};
use crate::handshake::DEFAULT_FIRMWARE_VERSION;

/// Per-link protocol settings.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Firmware version the host expects, sent in the handshake.
    pub firmware_version: u32,
    /// Largest write-burst chunk. Default: 600.
    pub atomic_tx: usize,
    /// Largest read-burst chunk. Default: 900.
    pub atomic_rx: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            firmware_version: DEFAULT_FIRMWARE_VERSION,
            atomic_tx: ATOMIC_TX,
            atomic_rx: ATOMIC_RX,
        }
    }
}

impl LinkConfig {
    /// Check the chunk thresholds against the frame buffer bounds.
    pub fn validate(&self) -> Result<()> {
        if self.atomic_tx == 0 || self.atomic_tx > MAX_COMMAND_PAYLOAD {
            return Err(LinkError::InvalidArgument(format!(
                "atomic_tx must be in 1..={MAX_COMMAND_PAYLOAD} (got {})",
                self.atomic_tx
            )));
        }
        if self.atomic_rx == 0 || self.atomic_rx > MAX_ANSWER_PAYLOAD {
            return Err(LinkError::InvalidArgument(format!(
                "atomic_rx must be in 1..={MAX_ANSWER_PAYLOAD} (got {})",
                self.atomic_rx
            )));
        }
        Ok(())
    }
}

/// Settings for discovering and opening a serial link.
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct OpenConfig {
    /// Device paths tried in order.
    pub candidates: Vec<PathBuf>,
    /// Line settings applied to each candidate.
    pub serial: SerialConfig,
    /// Protocol settings for the resulting link.
    pub link: LinkConfig,
}

#[cfg(unix)]
impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            candidates: candidate_paths(),
            serial: SerialConfig::default(),
            link: LinkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = LinkConfig::default();
        assert_eq!(cfg.atomic_tx, 600);
        assert_eq!(cfg.atomic_rx, 900);
        assert_eq!(cfg.firmware_version, 0x010a0006);
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_threshold_rejected() {
        let cfg = LinkConfig {
            atomic_rx: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(LinkError::InvalidArgument(_))));
    }

    #[test]
    fn threshold_above_buffer_rejected() {
        let cfg = LinkConfig {
            atomic_tx: MAX_COMMAND_PAYLOAD + 1,
            ..LinkConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(LinkError::InvalidArgument(_))));
    }

    #[cfg(unix)]
    #[test]
    fn open_config_probes_acm_nodes() {
        let cfg = OpenConfig::default();
        assert_eq!(cfg.candidates.len(), 10);
        assert_eq!(cfg.serial.baud_rate, 921_600);
    }
}
