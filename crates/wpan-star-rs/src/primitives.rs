//! The service primitives exchanged with the external MAC engine.
//!
//! Inbound confirmations/indications form one closed tagged union
//! ([`MacEvent`]) dispatched into the protocol state machine, and outbound
//! requests form another ([`MacRequest`]) handed to the engine. Keeping both
//! sets closed preserves the single-threaded ordering guarantee of the
//! callback model without requiring async machinery.

use crate::types::{
    AddressSpec, AddressingMode, AssociationStatus, CapabilityInfo, ExtendedAddress, MacStatus,
    PanId, ShortAddress, SuperframeSpec,
};
use alloc::vec::Vec;

/// PIB attribute identifiers used by the formation sequence.
/// (IEEE 802.15.4-2006, Table 86)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PibAttributeId {
    AssociationPermit = 0x41,
    RxOnWhenIdle = 0x52,
    ShortAddress = 0x53,
}

/// A PIB attribute write, value included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PibAttribute {
    ShortAddress(ShortAddress),
    AssociationPermit(bool),
    RxOnWhenIdle(bool),
}

impl PibAttribute {
    /// The identifier the matching set-confirm will be keyed by.
    pub fn id(&self) -> PibAttributeId {
        match self {
            PibAttribute::ShortAddress(_) => PibAttributeId::ShortAddress,
            PibAttribute::AssociationPermit(_) => PibAttributeId::AssociationPermit,
            PibAttribute::RxOnWhenIdle(_) => PibAttributeId::RxOnWhenIdle,
        }
    }
}

/// Scan kinds defined by MLME-SCAN.request. This core only issues active
/// scans; the other kinds exist for engine implementations.
/// (IEEE 802.15.4-2006, Section 7.1.11.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScanType {
    EnergyDetect = 0x00,
    Active = 0x01,
    Passive = 0x02,
    Orphan = 0x03,
}

/// One entry of an active-scan result list: a coordinator heard on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanDescriptor {
    /// How the coordinator addresses itself, including its PAN identifier.
    pub coord_address: AddressSpec,
    pub logical_channel: u8,
    pub channel_page: u8,
    /// Superframe word from the beacon, carrying the association-permit bit.
    pub superframe_spec: SuperframeSpec,
    /// Link quality of the beacon reception.
    pub link_quality: u8,
}

/// Requests the core issues to the MAC engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacRequest {
    /// MLME-RESET.request. The core always asks for a full reset.
    Reset { set_default_pib: bool },
    /// MLME-SCAN.request over the configured channel bitmap.
    Scan {
        scan_type: ScanType,
        channels: u32,
        duration: u8,
        channel_page: u8,
    },
    /// MLME-SET.request for one PIB attribute.
    Set(PibAttribute),
    /// MLME-START.request. Superframe orders are pinned to 15 by the caller
    /// (nonbeacon-enabled network).
    Start {
        pan_id: PanId,
        channel: u8,
        channel_page: u8,
        beacon_order: u8,
        superframe_order: u8,
        pan_coordinator: bool,
        battery_life_extension: bool,
        coord_realignment: bool,
    },
    /// MLME-ASSOCIATE.request towards a discovered coordinator.
    Associate {
        channel: u8,
        channel_page: u8,
        coordinator: AddressSpec,
        capabilities: CapabilityInfo,
    },
    /// MLME-ASSOCIATE.response answering an inbound association indication.
    AssociateResponse {
        device: ExtendedAddress,
        short_address: ShortAddress,
        status: AssociationStatus,
    },
    /// MCPS-DATA.request carrying one application datagram.
    DataRequest {
        source_mode: AddressingMode,
        destination: AddressSpec,
        payload: Vec<u8>,
        handle: u8,
        ack_requested: bool,
    },
}

/// Confirmations and indications delivered by the MAC engine.
///
/// The core must be fed these in the order the engine produced them; they
/// are the only inputs that advance the protocol state machine besides
/// timer expiries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacEvent {
    /// MLME-RESET.confirm.
    ResetConfirm { status: MacStatus },
    /// MLME-SCAN.confirm with the collected PAN descriptors.
    ScanConfirm {
        status: MacStatus,
        channel_page: u8,
        results: Vec<PanDescriptor>,
    },
    /// MLME-SET.confirm, keyed by the attribute that was written.
    SetConfirm {
        status: MacStatus,
        attribute: PibAttributeId,
    },
    /// MLME-START.confirm.
    StartConfirm { status: MacStatus },
    /// MLME-ASSOCIATE.confirm (device side).
    AssociateConfirm {
        status: MacStatus,
        short_address: ShortAddress,
    },
    /// MLME-ASSOCIATE.indication (coordinator side, inbound join).
    AssociateIndication {
        device: ExtendedAddress,
        capabilities: CapabilityInfo,
    },
    /// MLME-COMM-STATUS.indication reporting the fate of a response frame.
    CommStatusIndication {
        status: MacStatus,
        source: AddressSpec,
        destination: AddressSpec,
    },
    /// MCPS-DATA.confirm for an earlier data request, matched by handle.
    DataConfirm { status: MacStatus, handle: u8 },
    /// MCPS-DATA.indication carrying inbound application data.
    DataIndication {
        source: AddressSpec,
        destination: AddressSpec,
        payload: Vec<u8>,
        link_quality: u8,
        sequence_number: u8,
    },
}
