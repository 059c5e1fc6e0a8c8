//! Firmware configuration
//!
//! Everything here is fixed at build time. The firmware reads no
//! configuration at runtime and persists nothing: every boot starts from
//! [`FirmwareConfig::DEFAULT`].

use crate::parameters::ParameterSet;
use crate::protocol::ReadTimeouts;
use crate::pulse::{FeedSourcePolicy, ReconfigSettings};

/// Parameter set programmed at boot
pub const DEFAULT_PARAMETERS: ParameterSet = ParameterSet::new(10, 10, 10, 0);

/// Build-time firmware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareConfig {
    /// Parameter set programmed at boot
    pub defaults: ParameterSet,
    /// Per-position serial read timeouts
    pub timeouts: ReadTimeouts,
    /// Reconfiguration sequence tunables
    pub reconfig: ReconfigSettings,
    /// Words written per feed transfer before the completion interrupt
    pub feed_burst: u32,
}

impl FirmwareConfig {
    pub const DEFAULT: Self = Self {
        defaults: DEFAULT_PARAMETERS,
        timeouts: ReadTimeouts::DEFAULT,
        reconfig: ReconfigSettings {
            prefill_words: 7,
            offset_bias: 2,
            feed_policy: FeedSourcePolicy::Fixed,
        },
        feed_burst: 1024,
    };
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::Proposal;
    use crate::platform::mock::TX_FIFO_DEPTH;

    #[test]
    fn test_defaults_satisfy_bounds() {
        assert!(Proposal::validate(FirmwareConfig::DEFAULT.defaults).is_ok());
    }

    #[test]
    fn test_prefill_leaves_room_for_config_word() {
        let config = FirmwareConfig::DEFAULT;
        assert!(config.reconfig.prefill_words < TX_FIFO_DEPTH);
    }

    #[test]
    fn test_bias_matches_offset_bound() {
        assert_eq!(
            FirmwareConfig::DEFAULT.reconfig.offset_bias,
            crate::parameters::MIN_OFFSET
        );
    }
}
