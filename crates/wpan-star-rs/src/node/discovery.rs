//! Network discovery: bounded-retry active scans and coordinator selection.

use super::context::NodeContext;
use super::states::NodeState;
use super::NodeAction;
use crate::config::NetworkConfig;
use crate::primitives::{MacRequest, PanDescriptor, PibAttribute, ScanType};
use crate::types::{Address, CapabilityInfo, MacStatus, ShortAddress};
use alloc::vec::Vec;
use log::{info, warn};

/// Builds the active-scan request from the static configuration.
pub(super) fn scan_request(config: &NetworkConfig) -> MacRequest {
    MacRequest::Scan {
        scan_type: ScanType::Active,
        channels: config.scan_channels,
        duration: config.scan_duration,
        channel_page: config.channel_page,
    }
}

/// Judges the scan outcome: join the first usable coordinator, scan again,
/// fall back into forming a network, or reset on anything unexpected.
pub(super) fn on_scan_confirm(
    ctx: &mut NodeContext,
    status: MacStatus,
    results: &[PanDescriptor],
    actions: &mut Vec<NodeAction>,
) {
    if ctx.state != NodeState::ScanningForNetwork {
        warn!("scan confirm in {:?}, ignoring", ctx.state);
        return;
    }
    // Counted before the outcome is judged; the fallback into formation is
    // keyed off this total.
    ctx.scan_attempts = ctx.scan_attempts.saturating_add(1);

    match status {
        MacStatus::Success => {
            let Some(descriptor) = select_coordinator(&ctx.config, results) else {
                retry_or_form(ctx, actions, "no matching coordinator heard");
                return;
            };
            match descriptor.coord_address.address {
                Address::Short(short) => ctx.coordinator.short_address = short,
                Address::Extended(extended) => ctx.coordinator.extended_address = extended,
                Address::None => {
                    warn!("coordinator advertised without a usable address, resetting");
                    ctx.request_reset(actions);
                    return;
                }
            }
            info!(
                "coordinator found on channel {} (PAN {}), associating",
                descriptor.logical_channel, descriptor.coord_address.pan_id
            );
            ctx.state = NodeState::JoiningNetwork;
            actions.push(NodeAction::Request(MacRequest::Associate {
                channel: descriptor.logical_channel,
                channel_page: descriptor.channel_page,
                coordinator: descriptor.coord_address,
                capabilities: CapabilityInfo::ALLOCATE_ADDRESS,
            }));
        }
        MacStatus::NoBeacon => retry_or_form(ctx, actions, "no beacon heard"),
        other => {
            warn!("scan failed ({:?}), resetting", other);
            ctx.request_reset(actions);
        }
    }
}

/// The first entry matching configured channel, channel page, and PAN id
/// with the association-permit bit set wins; candidates are not scored.
fn select_coordinator<'a>(
    config: &NetworkConfig,
    results: &'a [PanDescriptor],
) -> Option<&'a PanDescriptor> {
    results.iter().find(|descriptor| {
        descriptor.logical_channel == config.channel
            && descriptor.channel_page == config.channel_page
            && descriptor.coord_address.pan_id == config.pan_id
            && descriptor.superframe_spec.association_permitted()
    })
}

/// Scan again while attempts remain, otherwise begin forming a network by
/// assigning the coordinator short address.
fn retry_or_form(ctx: &mut NodeContext, actions: &mut Vec<NodeAction>, reason: &str) {
    if ctx.scan_attempts < ctx.config.max_scan_attempts {
        info!(
            "{}, scanning again ({}/{})",
            reason, ctx.scan_attempts, ctx.config.max_scan_attempts
        );
        actions.push(NodeAction::Request(scan_request(&ctx.config)));
    } else {
        info!("{}, starting a new network", reason);
        ctx.state = NodeState::FormingNetwork;
        actions.push(NodeAction::Request(MacRequest::Set(
            PibAttribute::ShortAddress(ShortAddress::COORDINATOR),
        )));
    }
}
