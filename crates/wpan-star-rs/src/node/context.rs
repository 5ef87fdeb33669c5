use super::NodeAction;
use super::states::NodeState;
use crate::assoc::{AssociatedDevice, DeviceTable};
use crate::config::{MAX_DEVICES, NetworkConfig};
use crate::primitives::MacRequest;
use alloc::vec::Vec;
use log::error;

/// Holds the complete mutable state of a star-network node.
///
/// Every field is touched only from serially dispatched event handlers
/// (single-threaded event model), so no locking is involved.
pub(crate) struct NodeContext {
    pub(crate) config: NetworkConfig,
    pub(crate) state: NodeState,
    /// Coordinator captured from the winning scan result (device role).
    pub(crate) coordinator: AssociatedDevice,
    /// Devices joined so far (coordinator role).
    pub(crate) devices: DeviceTable<MAX_DEVICES>,
    /// Scan confirmations seen since process start. Never cleared, not even
    /// by a full reset, so intervening resets do not delay the fallback
    /// into network formation.
    pub(crate) scan_attempts: u8,
    /// Full-reset requests issued since process start.
    pub(crate) reset_attempts: u32,
    /// Handle of the most recent outbound datagram; wraps at the u8 width.
    pub(crate) last_handle: u8,
}

impl NodeContext {
    pub(crate) fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            state: NodeState::Idle,
            coordinator: AssociatedDevice::default(),
            devices: DeviceTable::new(),
            scan_attempts: 0,
            reset_attempts: 0,
            last_handle: 0,
        }
    }

    /// Funnel for every recoverable-by-restart failure: request one full MAC
    /// reset, or park in `Halted` once a configured budget is exhausted.
    pub(crate) fn request_reset(&mut self, actions: &mut Vec<NodeAction>) {
        if let Some(limit) = self.config.reset_attempt_limit {
            if self.reset_attempts >= limit {
                error!(
                    "reset budget exhausted after {} attempts, halting",
                    self.reset_attempts
                );
                self.state = NodeState::Halted;
                return;
            }
        }
        self.reset_attempts += 1;
        self.state = NodeState::Resetting;
        actions.push(NodeAction::Request(MacRequest::Reset {
            set_default_pib: true,
        }));
    }
}
