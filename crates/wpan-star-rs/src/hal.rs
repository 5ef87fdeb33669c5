use crate::node::TimerId;
use crate::primitives::{MacEvent, MacRequest};
use crate::types::ExtendedAddress;
use core::fmt;

/// Defines a portable, descriptive Error type for the star-network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WpanError {
    /// A configured logical channel is outside the supported band.
    InvalidChannel(u8),
    /// The configured scan duration exponent is out of range.
    InvalidScanDuration(u8),
    /// The configured channel bitmap selects no channel at all.
    EmptyChannelMask,
    /// The MAC engine rejected or could not service a request.
    Engine(&'static str),
}

impl fmt::Display for WpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(ch) => write!(f, "Invalid logical channel: {ch}"),
            Self::InvalidScanDuration(d) => write!(f, "Invalid scan duration exponent: {d}"),
            Self::EmptyChannelMask => write!(f, "Channel bitmap selects no channel"),
            Self::Engine(s) => write!(f, "MAC engine error: {s}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WpanError {}

/// Abstraction over the external MAC/PHY engine.
///
/// The core never talks to a radio: it emits [`MacRequest`]s and consumes the
/// resulting [`MacEvent`]s, which the host shell moves across this boundary.
/// Requests run to their confirmation; there is no cancellation other than a
/// full reset superseding whatever was in flight.
pub trait MacEngine {
    /// Hands one request to the engine.
    fn request(&mut self, request: MacRequest) -> Result<(), WpanError>;

    /// Retrieves the next pending confirmation or indication, if any.
    fn poll(&mut self) -> Option<MacEvent>;

    /// Returns the 64-bit IEEE address of the local node.
    fn extended_address(&self) -> ExtendedAddress;
}

/// Abstraction over the host's timer service.
///
/// Timer identifiers are exclusive slots: starting a slot that is already
/// running must stop the prior instance first, and stopping must be
/// idempotent against an already-expired or never-started slot.
pub trait TimerService {
    /// (Re)arms `timer` to expire `duration_us` microseconds from now.
    fn start(&mut self, timer: TimerId, duration_us: u64);

    /// Stops `timer` if it is running.
    fn stop(&mut self, timer: TimerId);
}
