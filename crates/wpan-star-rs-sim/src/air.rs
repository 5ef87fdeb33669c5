//! The shared virtual radio medium.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use wpan_star_rs::primitives::{MacEvent, PanDescriptor};
use wpan_star_rs::types::{
    Address, AddressSpec, ExtendedAddress, PanId, ShortAddress, SuperframeSpec,
};

/// An application datagram that crossed the medium, kept for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredDatagram {
    pub pan_id: PanId,
    pub source: ShortAddress,
    pub destination: ShortAddress,
    pub payload: Vec<u8>,
}

/// One started coordinator, as it would appear in beacon responses.
#[derive(Debug, Clone)]
struct CoordinatorEntry {
    extended: ExtendedAddress,
    short: ShortAddress,
    pan_id: PanId,
    channel: u8,
    channel_page: u8,
    association_permit: bool,
}

#[derive(Default)]
struct NodeSlot {
    /// Short address and PAN this node currently holds on the air.
    short: Option<(PanId, ShortAddress)>,
    /// Pending confirmations/indications, drained by the node's engine.
    inbox: VecDeque<MacEvent>,
}

/// The medium all simulated engines share: tracks started coordinators,
/// routes frames by short address, and queues events per node.
#[derive(Default)]
pub struct VirtualAir {
    nodes: HashMap<ExtendedAddress, NodeSlot>,
    coordinators: Vec<CoordinatorEntry>,
    /// Trace of all application datagrams delivered on the medium.
    pub delivered: Vec<DeliveredDatagram>,
}

impl VirtualAir {
    /// A fresh medium behind the shared handle the engines hold.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Registers a node (creates its inbox).
    pub(crate) fn register(&mut self, extended: ExtendedAddress) {
        self.nodes.entry(extended).or_default();
    }

    /// Queues one event for `node`.
    pub(crate) fn deliver(&mut self, node: ExtendedAddress, event: MacEvent) {
        self.nodes.entry(node).or_default().inbox.push_back(event);
    }

    /// Retrieves the next pending event for `node`.
    pub(crate) fn pop_event(&mut self, node: ExtendedAddress) -> Option<MacEvent> {
        self.nodes.get_mut(&node)?.inbox.pop_front()
    }

    /// A full reset drops the node off the air: its coordinator entry, its
    /// short address, and any in-flight events disappear.
    pub(crate) fn reset_node(&mut self, node: ExtendedAddress) {
        self.coordinators.retain(|entry| entry.extended != node);
        let slot = self.nodes.entry(node).or_default();
        slot.short = None;
        slot.inbox.clear();
    }

    /// Beacon responses an active scan over `channels`/`channel_page` would
    /// collect.
    pub(crate) fn scan(&self, channels: u32, channel_page: u8) -> Vec<PanDescriptor> {
        self.coordinators
            .iter()
            .filter(|entry| {
                channels & (1u32 << entry.channel) != 0 && entry.channel_page == channel_page
            })
            .map(|entry| PanDescriptor {
                coord_address: AddressSpec {
                    pan_id: entry.pan_id,
                    address: Address::Short(entry.short),
                },
                logical_channel: entry.channel,
                channel_page: entry.channel_page,
                superframe_spec: SuperframeSpec::nonbeacon_coordinator(entry.association_permit),
                link_quality: beacon_lqi(),
            })
            .collect()
    }

    pub(crate) fn start_coordinator(
        &mut self,
        extended: ExtendedAddress,
        short: ShortAddress,
        pan_id: PanId,
        channel: u8,
        channel_page: u8,
        association_permit: bool,
    ) {
        self.coordinators.retain(|entry| entry.extended != extended);
        self.coordinators.push(CoordinatorEntry {
            extended,
            short,
            pan_id,
            channel,
            channel_page,
            association_permit,
        });
        self.nodes.entry(extended).or_default().short = Some((pan_id, short));
    }

    pub(crate) fn set_association_permit(&mut self, extended: ExtendedAddress, permit: bool) {
        if let Some(entry) = self
            .coordinators
            .iter_mut()
            .find(|entry| entry.extended == extended)
        {
            entry.association_permit = permit;
        }
    }

    /// Resolves a coordinator address specification to the node running it.
    pub(crate) fn find_coordinator(&self, spec: &AddressSpec) -> Option<ExtendedAddress> {
        self.coordinators
            .iter()
            .find(|entry| {
                entry.pan_id == spec.pan_id
                    && match spec.address {
                        Address::Short(short) => entry.short == short,
                        Address::Extended(extended) => entry.extended == extended,
                        Address::None => false,
                    }
            })
            .map(|entry| entry.extended)
    }

    /// The PAN a started coordinator serves.
    pub(crate) fn coordinator_pan(&self, extended: ExtendedAddress) -> Option<PanId> {
        self.coordinators
            .iter()
            .find(|entry| entry.extended == extended)
            .map(|entry| entry.pan_id)
    }

    /// Records the short address a coordinator allocated to `device`.
    pub(crate) fn assign_short(
        &mut self,
        device: ExtendedAddress,
        pan_id: PanId,
        short: ShortAddress,
    ) {
        self.nodes.entry(device).or_default().short = Some((pan_id, short));
    }

    pub(crate) fn short_of(&self, node: ExtendedAddress) -> Option<(PanId, ShortAddress)> {
        self.nodes.get(&node)?.short
    }

    /// Finds the node holding `short` on `pan_id`.
    pub(crate) fn node_by_short(
        &self,
        pan_id: PanId,
        short: ShortAddress,
    ) -> Option<ExtendedAddress> {
        self.nodes
            .iter()
            .find(|(_, slot)| slot.short == Some((pan_id, short)))
            .map(|(&extended, _)| extended)
    }
}

/// Plausible link quality for a beacon heard nearby.
fn beacon_lqi() -> u8 {
    0xC0 | (rand::random::<u8>() & 0x3F)
}
