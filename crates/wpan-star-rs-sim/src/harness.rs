//! The polling-loop shell around one node.

use std::cell::RefCell;
use std::rc::Rc;

use wpan_star_rs::hal::{MacEngine, TimerService, WpanError};
use wpan_star_rs::node::{NodeAction, StarNode};
use wpan_star_rs::types::ExtendedAddress;
use wpan_star_rs::NetworkConfig;

use crate::air::VirtualAir;
use crate::engine::SimMacEngine;
use crate::timers::{SimClock, SimTimers};

/// Upper bound on engine callbacks dispatched per loop iteration, so one
/// chatty node cannot starve the others in a shared-loop simulation.
const MAX_EVENTS_PER_CYCLE: usize = 8;

/// Wires a [`StarNode`], its simulated engine, and its timer slots into the
/// pump a firmware main loop would provide.
pub struct NodeHarness {
    pub node: StarNode,
    pub engine: SimMacEngine,
    pub timers: SimTimers,
}

impl NodeHarness {
    pub fn new(
        config: NetworkConfig,
        air: &Rc<RefCell<VirtualAir>>,
        clock: SimClock,
        extended: ExtendedAddress,
    ) -> Result<Self, WpanError> {
        Ok(Self {
            node: StarNode::new(config)?,
            engine: SimMacEngine::new(air, extended),
            timers: SimTimers::new(clock),
        })
    }

    /// Boots the node: the power-on reset request.
    pub fn start(&mut self) -> Result<(), WpanError> {
        let actions = self.node.start();
        self.apply(actions)
    }

    /// One iteration of the polling loop: a bounded number of engine events,
    /// then any expired timer slots.
    pub fn run_cycle(&mut self) -> Result<(), WpanError> {
        for _ in 0..MAX_EVENTS_PER_CYCLE {
            let Some(event) = self.engine.poll() else {
                break;
            };
            let actions = self.node.handle_event(event);
            self.apply(actions)?;
        }
        for timer in self.timers.take_expired() {
            let actions = self.node.timer_expired(timer);
            self.apply(actions)?;
        }
        Ok(())
    }

    fn apply(&mut self, actions: Vec<NodeAction>) -> Result<(), WpanError> {
        for action in actions {
            match action {
                NodeAction::Request(request) => self.engine.request(request)?,
                NodeAction::StartTimer { timer, duration_us } => {
                    self.timers.start(timer, duration_us)
                }
                NodeAction::StopTimer(timer) => self.timers.stop(timer),
            }
        }
        Ok(())
    }
}
