//! The coordinator role: PIB configuration sequence, network start, and
//! inbound association handling.

use super::context::NodeContext;
use super::states::{NodeState, Role};
use super::{NodeAction, TimerId};
use crate::primitives::{MacRequest, PibAttribute, PibAttributeId};
use crate::types::{AssociationStatus, CapabilityInfo, ExtendedAddress, MacStatus, ShortAddress};
use alloc::vec::Vec;
use log::{debug, info, warn};

/// Beacon and superframe order for a nonbeacon-enabled network.
const NONBEACON_ORDER: u8 = 15;

/// Drives the attribute chain: short address, then association permit, then
/// rx-on-when-idle. Each confirmation gates the next write; the attribute
/// identifier tells us which link just completed.
pub(super) fn on_set_confirm(
    ctx: &mut NodeContext,
    status: MacStatus,
    attribute: PibAttributeId,
    actions: &mut Vec<NodeAction>,
) {
    if ctx.state != NodeState::FormingNetwork {
        warn!("set confirm for {:?} in {:?}, ignoring", attribute, ctx.state);
        return;
    }
    if !status.is_success() {
        warn!("setting {:?} failed ({:?}), resetting", attribute, status);
        ctx.request_reset(actions);
        return;
    }
    match attribute {
        PibAttributeId::ShortAddress => {
            debug!("short address set, permitting association");
            actions.push(NodeAction::Request(MacRequest::Set(
                PibAttribute::AssociationPermit(true),
            )));
        }
        PibAttributeId::AssociationPermit => {
            debug!("association permitted, enabling receiver while idle");
            actions.push(NodeAction::Request(MacRequest::Set(
                PibAttribute::RxOnWhenIdle(true),
            )));
        }
        PibAttributeId::RxOnWhenIdle => {
            info!(
                "PIB configured, starting network on channel {} (PAN {})",
                ctx.config.channel, ctx.config.pan_id
            );
            ctx.state = NodeState::StartingNetwork;
            actions.push(NodeAction::Request(MacRequest::Start {
                pan_id: ctx.config.pan_id,
                channel: ctx.config.channel,
                channel_page: ctx.config.channel_page,
                beacon_order: NONBEACON_ORDER,
                superframe_order: NONBEACON_ORDER,
                pan_coordinator: true,
                battery_life_extension: false,
                coord_realignment: false,
            }));
        }
    }
}

pub(super) fn on_start_confirm(
    ctx: &mut NodeContext,
    status: MacStatus,
    actions: &mut Vec<NodeAction>,
) {
    if ctx.state != NodeState::StartingNetwork {
        warn!("start confirm in {:?}, ignoring", ctx.state);
        return;
    }
    if status.is_success() {
        info!("network established, waiting for devices");
        ctx.state = NodeState::Operational(Role::Coordinator);
        actions.push(NodeAction::StopTimer(TimerId::NetworkIndication));
    } else {
        warn!("failed to establish network ({:?}), resetting", status);
        ctx.request_reset(actions);
    }
}

/// An inbound join. Handled to completion before the next indication can
/// arrive, so the table mutation needs no further guarding.
pub(super) fn on_associate_indication(
    ctx: &mut NodeContext,
    device: ExtendedAddress,
    capabilities: CapabilityInfo,
    actions: &mut Vec<NodeAction>,
) {
    if ctx.state != NodeState::Operational(Role::Coordinator) {
        warn!("association request from {} while not coordinating, ignoring", device);
        return;
    }
    debug!(
        "association request from {} (capabilities {:#04x})",
        device, capabilities.0
    );
    match ctx.devices.assign(device) {
        Some(short_address) => {
            info!("assigned short address {} to {}", short_address, device);
            actions.push(NodeAction::Request(MacRequest::AssociateResponse {
                device,
                short_address,
                status: AssociationStatus::Successful,
            }));
        }
        None => {
            warn!("PAN at capacity, rejecting {}", device);
            actions.push(NodeAction::Request(MacRequest::AssociateResponse {
                device,
                short_address: ShortAddress::UNASSIGNED,
                status: AssociationStatus::PanAtCapacity,
            }));
        }
    }
}

/// Fate of our association response. Informational either way; the device
/// record was already stored during address assignment.
pub(super) fn on_comm_status(status: MacStatus) {
    if status.is_success() {
        info!("device associated");
    } else {
        debug!("comm status: {:?}", status);
    }
}
