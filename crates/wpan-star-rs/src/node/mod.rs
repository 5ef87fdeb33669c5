pub mod states;

mod context;
mod coordinator;
mod device;
mod discovery;

pub use states::{NodeState, Role};

use crate::assoc::AssociatedDevice;
use crate::config::NetworkConfig;
use crate::hal::WpanError;
use crate::primitives::{MacEvent, MacRequest};
use crate::types::MacStatus;
use context::NodeContext;
use alloc::vec::Vec;
use log::{info, trace, warn};

/// Timer slots the node asks its host shell to run.
///
/// Identifiers are exclusive resource slots: starting one that is already
/// running restarts it, and stopping one is idempotent (see
/// [`crate::hal::TimerService`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Slow cadence reporting that the node is still searching for or
    /// setting up a network.
    NetworkIndication,
    /// Periodic application transmit cadence (device role).
    DataTx,
}

/// Represents the side effects a handler asks the host shell to perform,
/// in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    /// Issue a request to the MAC engine.
    Request(MacRequest),
    /// (Re)arm a timer slot.
    StartTimer { timer: TimerId, duration_us: u64 },
    /// Stop a timer slot.
    StopTimer(TimerId),
}

/// A star-network node: scans for a coordinator to join, and becomes the
/// coordinator itself when none is found.
///
/// The node is sans-I/O. The host shell pumps the MAC engine, feeds every
/// confirmation or indication into [`StarNode::handle_event`] and every
/// timer expiry into [`StarNode::timer_expired`], and performs the returned
/// actions.
pub struct StarNode {
    ctx: NodeContext,
}

impl StarNode {
    /// Creates a node from a validated configuration.
    pub fn new(config: NetworkConfig) -> Result<Self, WpanError> {
        config.validate()?;
        Ok(Self {
            ctx: NodeContext::new(config),
        })
    }

    pub fn state(&self) -> NodeState {
        self.ctx.state
    }

    pub fn role(&self) -> Option<Role> {
        self.ctx.state.role()
    }

    /// The coordinator selected during discovery, once the node runs as a
    /// device.
    pub fn coordinator(&self) -> Option<AssociatedDevice> {
        (self.role() == Some(Role::Device)).then_some(self.ctx.coordinator)
    }

    /// Devices associated so far, while the node runs as coordinator.
    pub fn associated_devices(&self) -> impl Iterator<Item = &AssociatedDevice> {
        self.ctx.devices.devices()
    }

    /// Kicks the whole process off with a full MAC reset.
    pub fn start(&mut self) -> Vec<NodeAction> {
        let mut actions = Vec::new();
        if self.ctx.state != NodeState::Idle {
            warn!("start() called in {:?}, ignoring", self.ctx.state);
            return actions;
        }
        info!("starting up, requesting MAC reset");
        self.ctx.request_reset(&mut actions);
        actions
    }

    /// Feeds one MAC confirmation or indication through the state machine.
    pub fn handle_event(&mut self, event: MacEvent) -> Vec<NodeAction> {
        let mut actions = Vec::new();
        if self.ctx.state == NodeState::Halted {
            trace!("halted, dropping {:?}", event);
            return actions;
        }
        match event {
            MacEvent::ResetConfirm { status } => self.on_reset_confirm(status, &mut actions),
            MacEvent::ScanConfirm {
                status,
                channel_page: _,
                results,
            } => discovery::on_scan_confirm(&mut self.ctx, status, &results, &mut actions),
            MacEvent::SetConfirm { status, attribute } => {
                coordinator::on_set_confirm(&mut self.ctx, status, attribute, &mut actions)
            }
            MacEvent::StartConfirm { status } => {
                coordinator::on_start_confirm(&mut self.ctx, status, &mut actions)
            }
            MacEvent::AssociateConfirm {
                status,
                short_address,
            } => device::on_associate_confirm(&mut self.ctx, status, short_address, &mut actions),
            MacEvent::AssociateIndication {
                device,
                capabilities,
            } => coordinator::on_associate_indication(
                &mut self.ctx,
                device,
                capabilities,
                &mut actions,
            ),
            MacEvent::CommStatusIndication { status, .. } => coordinator::on_comm_status(status),
            MacEvent::DataConfirm { status, handle } => device::on_data_confirm(status, handle),
            MacEvent::DataIndication {
                source,
                payload,
                link_quality,
                ..
            } => {
                // Inbound application data is not interpreted in any role.
                info!(
                    "received {} byte(s) from {:?} (LQI {})",
                    payload.len(),
                    source.address,
                    link_quality
                );
            }
        }
        actions
    }

    /// Host callback for an expired timer slot.
    pub fn timer_expired(&mut self, timer: TimerId) -> Vec<NodeAction> {
        let mut actions = Vec::new();
        match timer {
            TimerId::NetworkIndication => {
                // Re-armed for as long as the node is still getting a
                // network up; stopped on entering either operational role.
                if !self.ctx.state.is_operational() && self.ctx.state != NodeState::Halted {
                    info!("still searching ({:?})", self.ctx.state);
                    actions.push(NodeAction::StartTimer {
                        timer: TimerId::NetworkIndication,
                        duration_us: self.ctx.config.indication_period_us,
                    });
                }
            }
            TimerId::DataTx => device::on_data_timer(&mut self.ctx, &mut actions),
        }
        actions
    }

    fn on_reset_confirm(&mut self, status: MacStatus, actions: &mut Vec<NodeAction>) {
        if self.ctx.state != NodeState::Resetting {
            warn!("reset confirm in {:?}, ignoring", self.ctx.state);
            return;
        }
        if status.is_success() {
            info!("MAC reset complete, scanning for networks");
            self.ctx.state = NodeState::ScanningForNetwork;
            actions.push(NodeAction::Request(discovery::scan_request(
                &self.ctx.config,
            )));
            actions.push(NodeAction::StartTimer {
                timer: TimerId::NetworkIndication,
                duration_us: self.ctx.config.indication_period_us,
            });
        } else {
            warn!("MAC reset failed ({:?}), retrying", status);
            self.ctx.request_reset(actions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{PanDescriptor, PibAttributeId};
    use crate::types::{Address, AddressSpec, ShortAddress, SuperframeSpec};
    use alloc::vec;

    fn started_node() -> StarNode {
        let mut node = StarNode::new(NetworkConfig::default()).unwrap();
        let actions = node.start();
        assert!(matches!(
            actions[0],
            NodeAction::Request(MacRequest::Reset {
                set_default_pib: true
            })
        ));
        node
    }

    fn is_reset(actions: &[NodeAction]) -> bool {
        actions.len() == 1
            && matches!(
                actions[0],
                NodeAction::Request(MacRequest::Reset {
                    set_default_pib: true
                })
            )
    }

    #[test]
    fn test_start_requests_full_reset() {
        let node = started_node();
        assert_eq!(node.state(), NodeState::Resetting);
    }

    #[test]
    fn test_start_is_ignored_when_already_running() {
        let mut node = started_node();
        assert!(node.start().is_empty());
        assert_eq!(node.state(), NodeState::Resetting);
    }

    #[test]
    fn test_reset_failure_retries_reset() {
        let mut node = started_node();
        let actions = node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::ChannelAccessFailure,
        });
        assert!(is_reset(&actions));
        assert_eq!(node.state(), NodeState::Resetting);
    }

    #[test]
    fn test_reset_success_starts_scan_and_indication() {
        let mut node = started_node();
        let actions = node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::Success,
        });
        assert_eq!(actions.len(), 2);
        assert!(matches!(
            actions[0],
            NodeAction::Request(MacRequest::Scan { .. })
        ));
        assert!(matches!(
            actions[1],
            NodeAction::StartTimer {
                timer: TimerId::NetworkIndication,
                ..
            }
        ));
        assert_eq!(node.state(), NodeState::ScanningForNetwork);
    }

    /// Every confirmation stage maps an unexpected status to exactly one new
    /// reset request.
    #[test]
    fn test_unexpected_status_always_yields_one_reset() {
        // Scan stage.
        let mut node = started_node();
        node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::Success,
        });
        let actions = node.handle_event(MacEvent::ScanConfirm {
            status: MacStatus::InvalidParameter,
            channel_page: 0,
            results: vec![],
        });
        assert!(is_reset(&actions));

        // Attribute stage.
        let mut node = started_node();
        node.ctx.state = NodeState::FormingNetwork;
        let actions = node.handle_event(MacEvent::SetConfirm {
            status: MacStatus::InvalidParameter,
            attribute: PibAttributeId::ShortAddress,
        });
        assert!(is_reset(&actions));

        // Start stage.
        let mut node = started_node();
        node.ctx.state = NodeState::StartingNetwork;
        let actions = node.handle_event(MacEvent::StartConfirm {
            status: MacStatus::ChannelAccessFailure,
        });
        assert!(is_reset(&actions));

        // Associate stage.
        let mut node = started_node();
        node.ctx.state = NodeState::JoiningNetwork;
        let actions = node.handle_event(MacEvent::AssociateConfirm {
            status: MacStatus::NoAck,
            short_address: ShortAddress::UNASSIGNED,
        });
        assert!(is_reset(&actions));
    }

    #[test]
    fn test_finite_reset_budget_halts() {
        let config = NetworkConfig {
            reset_attempt_limit: Some(2),
            ..Default::default()
        };
        let mut node = StarNode::new(config).unwrap();
        assert!(!node.start().is_empty()); // attempt 1
        let actions = node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::ChannelAccessFailure,
        });
        assert!(is_reset(&actions)); // attempt 2
        let actions = node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::ChannelAccessFailure,
        });
        assert!(actions.is_empty());
        assert_eq!(node.state(), NodeState::Halted);

        // A halted node drops everything.
        assert!(
            node.handle_event(MacEvent::ResetConfirm {
                status: MacStatus::Success,
            })
            .is_empty()
        );
    }

    #[test]
    fn test_indication_timer_rearms_until_operational() {
        let mut node = started_node();
        node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::Success,
        });
        let actions = node.timer_expired(TimerId::NetworkIndication);
        assert!(matches!(
            actions[0],
            NodeAction::StartTimer {
                timer: TimerId::NetworkIndication,
                ..
            }
        ));

        node.ctx.state = NodeState::Operational(Role::Coordinator);
        assert!(node.timer_expired(TimerId::NetworkIndication).is_empty());
    }

    #[test]
    fn test_data_indication_is_observability_only() {
        let mut node = started_node();
        node.ctx.state = NodeState::Operational(Role::Coordinator);
        let actions = node.handle_event(MacEvent::DataIndication {
            source: AddressSpec {
                pan_id: node.ctx.config.pan_id,
                address: Address::Short(ShortAddress(1)),
            },
            destination: AddressSpec {
                pan_id: node.ctx.config.pan_id,
                address: Address::Short(ShortAddress::COORDINATOR),
            },
            payload: vec![0x42],
            link_quality: 0xFF,
            sequence_number: 7,
        });
        assert!(actions.is_empty());
    }

    #[test]
    fn test_scan_counter_survives_reset() {
        let mut node = started_node();
        node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::Success,
        });
        // One fruitless scan.
        node.handle_event(MacEvent::ScanConfirm {
            status: MacStatus::NoBeacon,
            channel_page: 0,
            results: vec![],
        });
        assert_eq!(node.ctx.scan_attempts, 1);

        // A failure elsewhere forces a full reset; the counter must survive.
        node.ctx.state = NodeState::JoiningNetwork;
        node.handle_event(MacEvent::AssociateConfirm {
            status: MacStatus::NoAck,
            short_address: ShortAddress::UNASSIGNED,
        });
        assert_eq!(node.ctx.scan_attempts, 1);

        node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::Success,
        });
        node.handle_event(MacEvent::ScanConfirm {
            status: MacStatus::NoBeacon,
            channel_page: 0,
            results: vec![],
        });
        assert_eq!(node.ctx.scan_attempts, 2);
    }

    #[test]
    fn test_unknown_coordinator_address_mode_resets() {
        let mut node = started_node();
        node.handle_event(MacEvent::ResetConfirm {
            status: MacStatus::Success,
        });
        let config = NetworkConfig::default();
        let descriptor = PanDescriptor {
            coord_address: AddressSpec {
                pan_id: config.pan_id,
                address: Address::None,
            },
            logical_channel: config.channel,
            channel_page: config.channel_page,
            superframe_spec: SuperframeSpec::nonbeacon_coordinator(true),
            link_quality: 0xFF,
        };
        let actions = node.handle_event(MacEvent::ScanConfirm {
            status: MacStatus::Success,
            channel_page: 0,
            results: vec![descriptor],
        });
        assert!(is_reset(&actions));
    }
}
