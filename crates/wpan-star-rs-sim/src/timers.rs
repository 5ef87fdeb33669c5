//! Virtual time and the timer slots running against it.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use wpan_star_rs::hal::TimerService;
use wpan_star_rs::node::TimerId;

/// Shared simulation clock, in microseconds.
#[derive(Clone, Default)]
pub struct SimClock {
    now_us: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_us(&self) -> u64 {
        self.now_us.get()
    }

    pub fn advance(&self, delta_us: u64) {
        self.now_us.set(self.now_us.get() + delta_us);
    }
}

/// Timer slots over the virtual clock.
///
/// Implements the slot contract the core relies on: starting a running slot
/// replaces its deadline, stopping is idempotent.
pub struct SimTimers {
    clock: SimClock,
    deadlines: HashMap<TimerId, u64>,
}

impl SimTimers {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            deadlines: HashMap::new(),
        }
    }

    /// Drains every slot whose deadline has passed.
    pub fn take_expired(&mut self) -> Vec<TimerId> {
        let now = self.clock.now_us();
        let expired: Vec<TimerId> = self
            .deadlines
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&timer, _)| timer)
            .collect();
        for timer in &expired {
            self.deadlines.remove(timer);
        }
        expired
    }
}

impl TimerService for SimTimers {
    fn start(&mut self, timer: TimerId, duration_us: u64) {
        // Insert replaces any prior deadline: restart semantics.
        self.deadlines.insert(timer, self.clock.now_us() + duration_us);
    }

    fn stop(&mut self, timer: TimerId) {
        self.deadlines.remove(&timer);
    }
}
