//! The device role: joining the selected coordinator and the periodic data
//! exchange that follows.

use super::context::NodeContext;
use super::states::{NodeState, Role};
use super::{NodeAction, TimerId};
use crate::primitives::MacRequest;
use crate::types::{Address, AddressSpec, AddressingMode, MacStatus, ShortAddress};
use alloc::vec;
use alloc::vec::Vec;
use log::{debug, info, trace, warn};

pub(super) fn on_associate_confirm(
    ctx: &mut NodeContext,
    status: MacStatus,
    short_address: ShortAddress,
    actions: &mut Vec<NodeAction>,
) {
    if ctx.state != NodeState::JoiningNetwork {
        warn!("associate confirm in {:?}, ignoring", ctx.state);
        return;
    }
    if status.is_success() {
        info!("joined network as {}", short_address);
        ctx.state = NodeState::Operational(Role::Device);
        actions.push(NodeAction::StopTimer(TimerId::NetworkIndication));
        actions.push(NodeAction::StartTimer {
            timer: TimerId::DataTx,
            duration_us: ctx.config.data_tx_period_us,
        });
    } else {
        warn!("association failed ({:?}), resetting", status);
        ctx.request_reset(actions);
    }
}

/// One transmit period: a single acknowledged datagram to the coordinator,
/// then re-arm the cadence whatever the outcome. Delivery is the MAC
/// layer's business; this component never retries a handle.
pub(super) fn on_data_timer(ctx: &mut NodeContext, actions: &mut Vec<NodeAction>) {
    if ctx.state != NodeState::Operational(Role::Device) {
        trace!("transmit cadence fired in {:?}, not re-arming", ctx.state);
        return;
    }
    ctx.last_handle = ctx.last_handle.wrapping_add(1);
    let handle = ctx.last_handle;
    // Always short-address mode: in this star topology the coordinator runs
    // at 0x0000, which is also what the slot holds when discovery captured
    // only a long address.
    let destination = AddressSpec {
        pan_id: ctx.config.pan_id,
        address: Address::Short(ctx.coordinator.short_address),
    };
    trace!("sending datagram, handle {}", handle);
    actions.push(NodeAction::Request(MacRequest::DataRequest {
        source_mode: AddressingMode::Short,
        destination,
        payload: vec![handle],
        handle,
        ack_requested: true,
    }));
    actions.push(NodeAction::StartTimer {
        timer: TimerId::DataTx,
        duration_us: ctx.config.data_tx_period_us,
    });
}

/// Delivery report for an earlier handle; observability only.
pub(super) fn on_data_confirm(status: MacStatus, handle: u8) {
    if status.is_success() {
        debug!("datagram {} delivered", handle);
    } else {
        warn!("datagram {} not delivered ({:?})", handle, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use alloc::vec;

    fn joining_context() -> NodeContext {
        let mut ctx = NodeContext::new(NetworkConfig::default());
        ctx.state = NodeState::JoiningNetwork;
        ctx.coordinator.short_address = ShortAddress::COORDINATOR;
        ctx
    }

    #[test]
    fn test_join_success_swaps_indication_for_data_cadence() {
        let mut ctx = joining_context();
        let mut actions = Vec::new();
        on_associate_confirm(&mut ctx, MacStatus::Success, ShortAddress(1), &mut actions);

        assert_eq!(ctx.state, NodeState::Operational(Role::Device));
        assert_eq!(
            actions,
            vec![
                NodeAction::StopTimer(TimerId::NetworkIndication),
                NodeAction::StartTimer {
                    timer: TimerId::DataTx,
                    duration_us: ctx.config.data_tx_period_us,
                },
            ]
        );
    }

    #[test]
    fn test_join_failure_resets() {
        let mut ctx = joining_context();
        let mut actions = Vec::new();
        on_associate_confirm(
            &mut ctx,
            MacStatus::PanAtCapacity,
            ShortAddress::UNASSIGNED,
            &mut actions,
        );
        assert_eq!(ctx.state, NodeState::Resetting);
        assert_eq!(
            actions,
            vec![NodeAction::Request(MacRequest::Reset {
                set_default_pib: true
            })]
        );
    }

    #[test]
    fn test_cadence_sends_and_rearms_with_increasing_handles() {
        let mut ctx = joining_context();
        ctx.state = NodeState::Operational(Role::Device);

        for expected_handle in 1..=3u8 {
            let mut actions = Vec::new();
            on_data_timer(&mut ctx, &mut actions);
            assert_eq!(actions.len(), 2);
            match &actions[0] {
                NodeAction::Request(MacRequest::DataRequest {
                    source_mode,
                    destination,
                    payload,
                    handle,
                    ack_requested,
                }) => {
                    assert_eq!(*source_mode, AddressingMode::Short);
                    assert_eq!(
                        destination.address,
                        Address::Short(ShortAddress::COORDINATOR)
                    );
                    assert_eq!(payload.len(), 1);
                    assert_eq!(*handle, expected_handle);
                    assert!(*ack_requested);
                }
                other => panic!("expected a data request, got {:?}", other),
            }
            assert!(matches!(
                actions[1],
                NodeAction::StartTimer {
                    timer: TimerId::DataTx,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_handle_wraps_at_numeric_width() {
        let mut ctx = joining_context();
        ctx.state = NodeState::Operational(Role::Device);
        ctx.last_handle = u8::MAX;

        let mut actions = Vec::new();
        on_data_timer(&mut ctx, &mut actions);
        match &actions[0] {
            NodeAction::Request(MacRequest::DataRequest { handle, .. }) => {
                assert_eq!(*handle, 0);
            }
            other => panic!("expected a data request, got {:?}", other),
        }
    }

    #[test]
    fn test_cadence_outside_device_role_stops() {
        let mut ctx = joining_context();
        ctx.state = NodeState::Resetting;
        let mut actions = Vec::new();
        on_data_timer(&mut ctx, &mut actions);
        assert!(actions.is_empty());
    }
}
