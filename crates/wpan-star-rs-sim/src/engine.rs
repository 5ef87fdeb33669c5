//! A per-node MAC engine over the shared [`VirtualAir`].

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;
use wpan_star_rs::hal::{MacEngine, WpanError};
use wpan_star_rs::primitives::{MacEvent, MacRequest, PibAttribute, ScanType};
use wpan_star_rs::types::{
    Address, AddressSpec, AssociationStatus, ExtendedAddress, MacStatus, ShortAddress,
};

use crate::air::{DeliveredDatagram, VirtualAir};

/// The slice of the PIB this simulation cares about.
struct Pib {
    short_address: ShortAddress,
    association_permit: bool,
    rx_on_when_idle: bool,
}

impl Default for Pib {
    fn default() -> Self {
        Self {
            short_address: ShortAddress::UNASSIGNED,
            association_permit: false,
            rx_on_when_idle: false,
        }
    }
}

/// Simulated MAC engine for one node.
///
/// Requests complete immediately: every confirmation is queued onto the
/// node's own inbox before `request` returns, and indications are queued
/// onto the peer's. There is no channel timing and no frame loss.
pub struct SimMacEngine {
    air: Rc<RefCell<VirtualAir>>,
    extended: ExtendedAddress,
    pib: Pib,
    started: bool,
    sequence: u8,
}

impl SimMacEngine {
    pub fn new(air: &Rc<RefCell<VirtualAir>>, extended: ExtendedAddress) -> Self {
        air.borrow_mut().register(extended);
        Self {
            air: Rc::clone(air),
            extended,
            pib: Pib::default(),
            started: false,
            sequence: 0,
        }
    }

    fn confirm(&self, event: MacEvent) {
        self.air.borrow_mut().deliver(self.extended, event);
    }
}

impl MacEngine for SimMacEngine {
    fn request(&mut self, request: MacRequest) -> Result<(), WpanError> {
        trace!("{} <- {:?}", self.extended, request);
        match request {
            MacRequest::Reset { set_default_pib } => {
                if set_default_pib {
                    self.pib = Pib::default();
                }
                self.started = false;
                self.air.borrow_mut().reset_node(self.extended);
                self.confirm(MacEvent::ResetConfirm {
                    status: MacStatus::Success,
                });
            }
            MacRequest::Scan {
                scan_type,
                channels,
                duration: _,
                channel_page,
            } => {
                if scan_type != ScanType::Active {
                    return Err(WpanError::Engine("only active scans are simulated"));
                }
                let results = self.air.borrow().scan(channels, channel_page);
                let status = if results.is_empty() {
                    MacStatus::NoBeacon
                } else {
                    MacStatus::Success
                };
                self.confirm(MacEvent::ScanConfirm {
                    status,
                    channel_page,
                    results,
                });
            }
            MacRequest::Set(attribute) => {
                match attribute {
                    PibAttribute::ShortAddress(short) => self.pib.short_address = short,
                    PibAttribute::AssociationPermit(permit) => {
                        self.pib.association_permit = permit;
                        if self.started {
                            self.air
                                .borrow_mut()
                                .set_association_permit(self.extended, permit);
                        }
                    }
                    PibAttribute::RxOnWhenIdle(on) => self.pib.rx_on_when_idle = on,
                }
                self.confirm(MacEvent::SetConfirm {
                    status: MacStatus::Success,
                    attribute: attribute.id(),
                });
            }
            MacRequest::Start {
                pan_id,
                channel,
                channel_page,
                pan_coordinator,
                ..
            } => {
                if !pan_coordinator {
                    return Err(WpanError::Engine("only PAN-coordinator start is simulated"));
                }
                if !self.pib.rx_on_when_idle {
                    trace!("{} starts with its receiver disabled while idle", self.extended);
                }
                self.started = true;
                self.air.borrow_mut().start_coordinator(
                    self.extended,
                    self.pib.short_address,
                    pan_id,
                    channel,
                    channel_page,
                    self.pib.association_permit,
                );
                self.confirm(MacEvent::StartConfirm {
                    status: MacStatus::Success,
                });
            }
            MacRequest::Associate {
                coordinator,
                capabilities,
                ..
            } => {
                let target = self.air.borrow().find_coordinator(&coordinator);
                match target {
                    Some(coordinator_node) => {
                        self.air.borrow_mut().deliver(
                            coordinator_node,
                            MacEvent::AssociateIndication {
                                device: self.extended,
                                capabilities,
                            },
                        );
                    }
                    // Nobody answers: the association request times out.
                    None => self.confirm(MacEvent::AssociateConfirm {
                        status: MacStatus::NoAck,
                        short_address: ShortAddress::UNASSIGNED,
                    }),
                }
            }
            MacRequest::AssociateResponse {
                device,
                short_address,
                status,
            } => {
                let mut air = self.air.borrow_mut();
                let pan_id = air.coordinator_pan(self.extended);
                if status == AssociationStatus::Successful {
                    if let Some(pan_id) = pan_id {
                        air.assign_short(device, pan_id, short_address);
                    }
                }
                air.deliver(
                    device,
                    MacEvent::AssociateConfirm {
                        status: status.into(),
                        short_address,
                    },
                );
                // The coordinator learns that its response went out.
                let pan_id = pan_id.unwrap_or_default();
                air.deliver(
                    self.extended,
                    MacEvent::CommStatusIndication {
                        status: MacStatus::Success,
                        source: AddressSpec {
                            pan_id,
                            address: Address::Short(self.pib.short_address),
                        },
                        destination: AddressSpec {
                            pan_id,
                            address: Address::Extended(device),
                        },
                    },
                );
            }
            MacRequest::DataRequest {
                destination,
                payload,
                handle,
                ..
            } => {
                let Address::Short(destination_short) = destination.address else {
                    return Err(WpanError::Engine(
                        "only short-address data delivery is simulated",
                    ));
                };
                self.sequence = self.sequence.wrapping_add(1);
                let sequence_number = self.sequence;

                let mut air = self.air.borrow_mut();
                let source_short = air
                    .short_of(self.extended)
                    .map(|(_, short)| short)
                    .unwrap_or(ShortAddress::UNASSIGNED);
                match air.node_by_short(destination.pan_id, destination_short) {
                    Some(target) => {
                        air.delivered.push(DeliveredDatagram {
                            pan_id: destination.pan_id,
                            source: source_short,
                            destination: destination_short,
                            payload: payload.clone(),
                        });
                        air.deliver(
                            target,
                            MacEvent::DataIndication {
                                source: AddressSpec {
                                    pan_id: destination.pan_id,
                                    address: Address::Short(source_short),
                                },
                                destination,
                                payload,
                                link_quality: 0xC0 | (rand::random::<u8>() & 0x3F),
                                sequence_number,
                            },
                        );
                        air.deliver(
                            self.extended,
                            MacEvent::DataConfirm {
                                status: MacStatus::Success,
                                handle,
                            },
                        );
                    }
                    // Nobody at that address: the acknowledgment never comes.
                    None => air.deliver(
                        self.extended,
                        MacEvent::DataConfirm {
                            status: MacStatus::NoAck,
                            handle,
                        },
                    ),
                }
            }
        }
        Ok(())
    }

    fn poll(&mut self) -> Option<MacEvent> {
        self.air.borrow_mut().pop_event(self.extended)
    }

    fn extended_address(&self) -> ExtendedAddress {
        self.extended
    }
}
