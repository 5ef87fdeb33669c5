use crate::hal::WpanError;
use crate::types::{
    C_FIRST_CHANNEL_24GHZ, C_LAST_CHANNEL_24GHZ, C_MAX_SCAN_DURATION, PanId,
};

/// Default PAN identifier of the network.
pub const DEFAULT_PAN_ID: PanId = PanId(0xBABE);

/// Default logical channel (2.4 GHz band).
pub const DEFAULT_CHANNEL: u8 = 20;

/// Default channel page.
pub const DEFAULT_CHANNEL_PAGE: u8 = 0;

/// Bitmap of all 2.4 GHz channels (11..=26).
pub const SCAN_ALL_CHANNELS: u32 = 0x07FF_F800;

/// Scan duration exponent: roughly a quarter second per channel.
pub const SCAN_DURATION: u8 = 4;

/// Number of fruitless scans after which the node starts its own network.
pub const MAX_SCAN_ATTEMPTS: u8 = 3;

/// Maximum number of devices the coordinator will accept.
pub const MAX_DEVICES: usize = 2;

/// Period of the device's application data transmissions, in microseconds.
pub const DATA_TX_PERIOD_US: u64 = 2_000_000;

/// Cadence of the "still searching" progress indication, in microseconds.
pub const NETWORK_INDICATION_PERIOD_US: u64 = 500_000;

/// Build-time network parameters of a node.
///
/// Owned by the node itself; there is no global configuration state. The
/// defaults reproduce the constants above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// PAN identifier to join or to start.
    pub pan_id: PanId,
    /// Logical channel the network lives on.
    pub channel: u8,
    /// Channel page the network lives on.
    pub channel_page: u8,
    /// Bitmap of channels covered by the active scan.
    pub scan_channels: u32,
    /// Scan duration exponent passed to MLME-SCAN.request.
    pub scan_duration: u8,
    /// Scans without a usable coordinator before forming a new network.
    pub max_scan_attempts: u8,
    /// Period of the device role's data transmissions, in microseconds.
    pub data_tx_period_us: u64,
    /// Cadence of the search progress indication, in microseconds.
    pub indication_period_us: u64,
    /// Upper bound on full-reset recovery attempts. `None` retries forever,
    /// which is the behavior an unattended node wants; a finite limit parks
    /// the node in `NodeState::Halted` once exhausted.
    pub reset_attempt_limit: Option<u32>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            pan_id: DEFAULT_PAN_ID,
            channel: DEFAULT_CHANNEL,
            channel_page: DEFAULT_CHANNEL_PAGE,
            scan_channels: SCAN_ALL_CHANNELS,
            scan_duration: SCAN_DURATION,
            max_scan_attempts: MAX_SCAN_ATTEMPTS,
            data_tx_period_us: DATA_TX_PERIOD_US,
            indication_period_us: NETWORK_INDICATION_PERIOD_US,
            reset_attempt_limit: None,
        }
    }
}

impl NetworkConfig {
    /// Checks the parameters against the limits of the 2.4 GHz band.
    pub fn validate(&self) -> Result<(), WpanError> {
        if !(C_FIRST_CHANNEL_24GHZ..=C_LAST_CHANNEL_24GHZ).contains(&self.channel) {
            return Err(WpanError::InvalidChannel(self.channel));
        }
        if self.scan_duration > C_MAX_SCAN_DURATION {
            return Err(WpanError::InvalidScanDuration(self.scan_duration));
        }
        if self.scan_channels == 0 {
            return Err(WpanError::EmptyChannelMask);
        }
        Ok(())
    }
}
